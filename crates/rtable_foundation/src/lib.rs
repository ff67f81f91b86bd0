//! Host data model for rtable.
//!
//! This crate provides:
//! - [`DataType`] - Type descriptors for host columns and values
//! - [`Value`] - The host value type, with explicit optionality
//! - [`Temporal`] / [`DateTimeKind`] - Date and time values
//! - [`TypeManager`] / [`TypeRegistry`] - Tagged (sum) type definitions
//! - [`Column`] / [`Table`] - Typed tables
//! - [`Error`] - Rich error types with context
//! - Persistent collections ([`RtVec`], [`RtMap`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
pub mod error;
pub mod table;
pub mod tagged;
pub mod temporal;
pub mod types;
pub mod value;

pub use collections::{RtMap, RtVec};
pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use table::{Column, Table};
pub use tagged::{MAYBE_TYPE_NAME, TagType, TaggedTypeDefinition, TypeManager, TypeRegistry};
pub use temporal::{DateTimeKind, Temporal};
pub use types::{DataType, RecordType, TaggedTypeRef};
pub use value::{TaggedValue, Value};
