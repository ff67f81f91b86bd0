//! File helpers: one RDS file per value.

use rtable_foundation::ErrorKind;
use rtable_rdata::{RValue, na_real, read_file, write_file};

#[test]
fn write_then_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scores.rds");
    let value = RValue::doubles(vec![0.5, na_real(), 2.0]);
    write_file(&path, &value).unwrap();
    assert_eq!(read_file(&path).unwrap(), value);
}

#[test]
fn files_start_with_the_xdr_magic() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x.rds");
    write_file(&path, &RValue::Nil).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..2], b"X\n");
}

#[test]
fn garbage_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "hello, world").unwrap();
    let err = read_file(&path).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Format(_)));
    assert!(err.to_string().contains("notes.txt"));
}
