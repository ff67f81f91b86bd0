//! Type-registry persistence using `MessagePack`.
//!
//! Factor types are registered as tables are read. Saving the registry
//! between runs lets later reads reuse the same type names for the same
//! level sets.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use rtable_foundation::{Error, ErrorKind, Result, TypeRegistry};

/// Serializes a registry to bytes using `MessagePack` format.
///
/// Uses named serialization to preserve struct field names.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_bytes(registry: &TypeRegistry) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(registry).map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))
}

/// Deserializes a registry from `MessagePack` bytes.
///
/// # Errors
///
/// Returns an error if deserialization fails.
pub fn from_bytes(bytes: &[u8]) -> Result<TypeRegistry> {
    rmp_serde::from_slice(bytes).map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))
}

/// Saves a registry to a file, replacing any previous contents.
///
/// # Errors
///
/// Returns an error if the file cannot be written or serialization fails.
pub fn save_to_file<P: AsRef<Path>>(registry: &TypeRegistry, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .map_err(|e| Error::io(format!("failed to create file '{}': {e}", path.display())))?;

    let mut writer = BufWriter::new(file);
    let bytes = to_bytes(registry)?;
    writer
        .write_all(&bytes)
        .and_then(|()| writer.flush())
        .map_err(|e| Error::io(format!("failed to write to file '{}': {e}", path.display())))
}

/// Loads a registry from a `MessagePack` file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or deserialization fails.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<TypeRegistry> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| Error::io(format!("failed to open file '{}': {e}", path.display())))?;

    let mut bytes = Vec::new();
    BufReader::new(file)
        .read_to_end(&mut bytes)
        .map_err(|e| Error::io(format!("failed to read file '{}': {e}", path.display())))?;

    from_bytes(&bytes)
}

/// Loads a registry if the file exists, otherwise starts a fresh one.
///
/// # Errors
///
/// Returns an error if an existing file cannot be read or decoded.
pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<TypeRegistry> {
    if path.as_ref().exists() {
        load_from_file(path)
    } else {
        Ok(TypeRegistry::new())
    }
}
