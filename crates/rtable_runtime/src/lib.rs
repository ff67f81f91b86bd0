//! R interpreter bridge, persistence, and CLI for rtable.
//!
//! This crate provides:
//! - [`RExecutor`] - Runs an R script over serialized inputs with a timeout
//! - [`ExecutionConfig`] - Interpreter path, arguments, and limits
//! - [`serialize`] - Type-registry persistence in `MessagePack`

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod execute;
pub mod serialize;

pub use config::ExecutionConfig;
pub use execute::RExecutor;
