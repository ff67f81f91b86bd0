//! Cross-layer integration tests for rtable
//!
//! Tests that tables survive the trip through R's serialization format and
//! that factor types persist across runs.

mod end_to_end;
mod registry;
