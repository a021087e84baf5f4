//! Infrastructure Layer
//!
//! External process execution.

pub mod executor;

pub use executor::{ExecutionError, ProcessExecutor};
