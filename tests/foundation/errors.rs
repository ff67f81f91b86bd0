//! Integration tests for Error types
//!
//! Tests error construction, display, and context frames.

use std::time::Duration;

use rtable_foundation::{DataType, Error, ErrorContext, ErrorKind};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_type_mismatch() {
    let err = Error::type_mismatch(DataType::Number, "text");
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
    let msg = format!("{err}");
    assert!(msg.contains("number"));
    assert!(msg.contains("text"));
}

#[test]
fn error_cannot_generalize() {
    let err = Error::cannot_generalize(DataType::Number, DataType::Text);
    assert!(matches!(err.kind, ErrorKind::CannotGeneralize { .. }));
    assert!(!err.is_internal());
}

#[test]
fn internal_kinds() {
    assert!(Error::internal("boom").is_internal());
    assert!(Error::new(ErrorKind::UnknownTypeTag(77)).is_internal());
    assert!(!Error::format("bad magic").is_internal());
    assert!(!Error::new(ErrorKind::NilValue).is_internal());
}

#[test]
fn process_failure_shows_both_streams() {
    let err = Error::new(ErrorKind::ProcessFailed {
        status: "exit status: 1".to_owned(),
        stdout: "partial".to_owned(),
        stderr: "Error in f(): oops".to_owned(),
    });
    let msg = err.to_string();
    assert!(msg.contains("exit status: 1"));
    assert!(msg.contains("partial"));
    assert!(msg.contains("oops"));
}

#[test]
fn sub_second_timeout_is_reported_exactly() {
    let err = Error::new(ErrorKind::ProcessTimeout {
        timeout: Duration::from_millis(200),
        stdout: String::new(),
        stderr: String::new(),
    });
    assert!(err.to_string().starts_with("R process timed out after 200ms"));
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn frames_accumulate_outward() {
    let err = Error::length_mismatch("column \"b\"", 2, 3).in_frame("table \"people\"");
    let msg = err.to_string();
    assert!(msg.contains("expected 2, got 3"));
    assert!(msg.contains("table \"people\""));
}

#[test]
fn context_names_the_source() {
    let err = Error::io("truncated R data: unexpected end of input")
        .with_context(ErrorContext::new().with_source("survey.rds"));
    assert!(err.to_string().contains("survey.rds"));
}

#[test]
fn io_errors_convert() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err: Error = io.into();
    assert!(matches!(err.kind, ErrorKind::Io(_)));
}
