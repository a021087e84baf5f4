//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod provision;
pub mod session_store;
pub mod sign_up;

// Re-exports
pub use config::AuthConfig;
pub use provision::{AdminProvisioning, provision_admin};
pub use session_store::SessionStore;
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
