//! Domain Layer
//!
//! Language builders, the registry that resolves them, and the records a
//! build produces.

pub mod builder;
pub mod entity;
pub mod languages;
pub mod registry;

// Re-exports
pub use builder::LanguageBuilder;
pub use entity::{BuildSpec, CapturedOutput, ExecutionResult, Stage};
pub use registry::{BuilderRegistry, ResolutionError};
