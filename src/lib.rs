//! rtable - Typed-table interchange with R
//!
//! This crate re-exports all layers of the rtable system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: rtable_runtime    - Rscript bridge, type-registry persistence, CLI
//! Layer 2: rtable_convert    - R values <-> typed tables, type generalization
//! Layer 1: rtable_rdata      - RDS/XDR reader and writer, factor/date classification
//! Layer 0: rtable_foundation - Host data model (types, values, tables, errors)
//! ```

pub use rtable_convert as convert;
pub use rtable_foundation as foundation;
pub use rtable_rdata as rdata;
pub use rtable_runtime as runtime;
