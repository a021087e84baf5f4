//! Application Layer
//!
//! Build pipeline and the compile/run/test use case.

pub mod compile;
pub mod config;
pub mod pipeline;

// Re-exports
pub use compile::{CompileInput, CompileOutput, CompileUseCase, SessionAuthority};
pub use config::CompileConfig;
pub use pipeline::{BuildPipeline, Workspace};
