//! Error types for rtable.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//!
//! Errors fall into two groups. Internal errors mean an invariant of the
//! codec or the type system was violated and indicate a bug. Everything else
//! is caused by input that is malformed or unsupported and is reported to
//! the user with the offending value or type named in the message.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::types::DataType;

/// Result type alias for rtable operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for rtable operations.
#[derive(Debug, Error)]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(context) = &self.context {
            write!(f, "{context}")?;
        }
        Ok(())
    }
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Pushes a frame onto this error's context, creating it if needed.
    #[must_use]
    pub fn in_frame(mut self, frame: impl Into<String>) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.with_frame(frame));
        self
    }

    /// Returns true if this error signals a bug rather than bad input.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Internal(_) | ErrorKind::UnknownTypeTag(_) | ErrorKind::TypeMismatch { .. }
        )
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Creates a format error for malformed serialized input.
    #[must_use]
    pub fn format(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Format(message.into()))
    }

    /// Creates an I/O error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io(message.into()))
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: DataType, actual: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeMismatch {
            expected,
            actual: actual.into(),
        })
    }

    /// Creates a generalization failure between two types.
    #[must_use]
    pub fn cannot_generalize(left: DataType, right: DataType) -> Self {
        Self::new(ErrorKind::CannotGeneralize { left, right })
    }

    /// Creates a length mismatch error.
    #[must_use]
    pub fn length_mismatch(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::new(ErrorKind::LengthMismatch {
            what: what.into(),
            expected,
            actual,
        })
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Internal invariant violation (should not happen).
    #[error("internal error: {0}")]
    Internal(String),

    /// The decoder met a type tag it does not know how to read.
    #[error("internal error: unknown R type tag {0}")]
    UnknownTypeTag(u8),

    /// A value did not have the shape its declared type promises.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected type.
        expected: DataType,
        /// Description of what was found.
        actual: String,
    },

    /// Serialized input is not in the expected format.
    #[error("malformed R data: {0}")]
    Format(String),

    /// Reading or writing failed, including truncated input.
    #[error("i/o error: {0}")]
    Io(String),

    /// A value was requested from an R `NULL`.
    #[error("cannot take a value out of an R NULL")]
    NilValue,

    /// Two parallel sequences disagree in length.
    #[error("length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        /// What was being compared.
        what: String,
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// No common type exists for two types.
    #[error("cannot generalize {left} and {right} into a common type")]
    CannotGeneralize {
        /// First type.
        left: DataType,
        /// Second type.
        right: DataType,
    },

    /// Generalization was asked for over no types at all.
    #[error("cannot generalize an empty list of types")]
    EmptyGeneralization,

    /// A factor code does not name one of the levels.
    #[error("factor index {index} is out of range for {levels} levels")]
    FactorIndexOutOfRange {
        /// The 1-based code found.
        index: i32,
        /// Number of level names.
        levels: usize,
    },

    /// Every candidate name for a new tagged type is taken.
    #[error("no free type name for \"{0}\": tried \"{0} 0\" to \"{0} 99\"")]
    TypeNamesExhausted(String),

    /// An R value holds several tables where one was expected.
    #[error("R value holds {count} tables where one was expected")]
    MultipleTables {
        /// Number of tables found.
        count: usize,
    },

    /// A tagged type name is not registered.
    #[error("unknown tagged type: {0}")]
    UnknownTaggedType(String),

    /// Tagged types with several payload-carrying tags cannot be expressed in R.
    #[error("nested tagged types are not supported: {0}")]
    NestedTaggedType(String),

    /// Lists or records nested deeper than R tables allow.
    #[error("lists/records not supported in R at depth {depth}: {data_type}")]
    UnsupportedNesting {
        /// Nesting depth at which the list or record was found.
        depth: usize,
        /// The offending type.
        data_type: DataType,
    },

    /// The external interpreter exited unsuccessfully.
    #[error("R process failed ({status}):\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}")]
    ProcessFailed {
        /// Exit status description.
        status: String,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },

    /// The external interpreter did not finish in time.
    #[error("R process timed out after {timeout:?}:\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}")]
    ProcessTimeout {
        /// The timeout that elapsed.
        timeout: Duration,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },

    /// Persisted state could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A configuration value could not be understood.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// File the error relates to.
    pub source: Option<String>,
    /// Conversion frames, innermost first (e.g. column, then table).
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source file.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds a frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, " (in {source})")?;
        }
        for frame in &self.stack {
            write!(f, "\n  in {frame}")?;
        }
        Ok(())
    }
}
