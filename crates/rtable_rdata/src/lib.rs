//! Reader and writer for R's serialization format.
//!
//! This crate provides:
//! - [`RValue`] - The in-memory form of one decoded R object
//! - [`TypeHeader`] - Bit decoding of node headers
//! - [`RReader`] / [`RWriter`] - The XDR decoder and encoder
//! - [`classify`] - Reconstruction of factors and dates after decoding
//! - [`pretty`] - A debug pretty-printer
//!
//! Only the XDR binary variant (`X\n`, what `saveRDS(compress = FALSE)`
//! produces) is supported.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod classify;
pub mod header;
pub mod pretty;
pub mod reader;
pub mod rvalue;
pub mod temporal;
pub mod writer;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use rtable_foundation::{Error, ErrorContext, Result};

pub use classify::classify;
pub use header::{NA_INTEGER, SexpType, TypeHeader, na_real};
pub use pretty::{PrettyConfig, pretty_print};
pub use reader::RReader;
pub use rvalue::{PairListEntry, RValue};
pub use writer::RWriter;

/// Decodes one R value from serialized bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not a complete XDR serialization.
pub fn from_bytes(bytes: &[u8]) -> Result<RValue> {
    RReader::new(bytes).read()
}

/// Encodes one R value to serialized bytes.
///
/// # Errors
///
/// Returns an error if a value cannot be represented in the format.
pub fn to_bytes(value: &RValue) -> Result<Vec<u8>> {
    RWriter::new(Vec::new()).write(value)
}

/// Reads an uncompressed RDS file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<RValue> {
    let path = path.as_ref();
    let source = || ErrorContext::new().with_source(path.display().to_string());
    let file = File::open(path).map_err(|e| Error::from(e).with_context(source()))?;
    RReader::new(BufReader::new(file))
        .read()
        .map_err(|e| e.with_context(source()))
}

/// Writes an uncompressed RDS file, replacing any existing file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_file<P: AsRef<Path>>(path: P, value: &RValue) -> Result<()> {
    let path = path.as_ref();
    let source = || ErrorContext::new().with_source(path.display().to_string());
    let file = File::create(path).map_err(|e| Error::from(e).with_context(source()))?;
    RWriter::new(BufWriter::new(file))
        .write(value)
        .map(drop)
        .map_err(|e| e.with_context(source()))
}
