//! Integration tests for the foundation layer
//!
//! Tests for the host data model: types, values, tagged types, tables, and
//! errors.

mod errors;
mod tables;
mod tagged;
