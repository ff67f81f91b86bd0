//! Conversion between R objects and typed host tables.
//!
//! This crate provides:
//! - [`RConverter`] - R values to typed host values
//! - [`generalize`] - Unification of inferred types with value lifts
//! - [`column_to_r`] - Host columns back to R vectors
//! - [`convert_r_to_tables`] / [`convert_table_to_r`] - data.frame and
//!   tibble conventions on top of the value converters

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod frame;
pub mod generalize;
pub mod names;
pub mod options;
pub mod to_host;
pub mod to_r;

pub use frame::{
    TableKind, convert_r_to_tables, convert_r_to_tables_with, convert_table_to_r,
    convert_table_to_r_with,
};
pub use generalize::{GeneralisedTypePair, Generalized, Lift, generalize, generalize_pair};
pub use options::ConvertOptions;
pub use to_host::{RConverter, TypedValues};
pub use to_r::column_to_r;
