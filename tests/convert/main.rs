//! Integration tests for the conversion layer
//!
//! Tests for type generalization, R value conversion, and table conventions.

mod generalize;
mod optional;
mod tables;
mod values;
