//! Integration tests for the R data layer
//!
//! Tests for decoding hand-built serializations, encode/decode round trips,
//! file helpers, and the pretty-printer.

mod decode;
mod files;
mod pretty;
mod round_trip;
