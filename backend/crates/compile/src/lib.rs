//! Compile (Build and Execute) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Language builders, registry, execution records
//! - `application/` - Build pipeline and the compile/run/test use case
//! - `infra/` - Process executor
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! A request is authenticated against the session store, its language tag
//! resolved to a builder, the source written to a fresh workspace, and the
//! builder's command run under a deadline with bounded output capture.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::CompileConfig;
pub use application::pipeline::BuildPipeline;
pub use domain::registry::BuilderRegistry;
pub use error::{CompileError, CompileResult};
pub use infra::executor::ProcessExecutor;
pub use presentation::router::compile_router;
