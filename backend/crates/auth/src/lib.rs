//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Session store and use cases
//! - `infra/` - Repository implementations (SQLite, in-memory)
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - User signup and login with user name + password
//! - In-memory bearer sessions with a fixed time-to-live
//! - Built-in administrator provisioned at startup
//!
//! ## Security Model
//! - Passwords derived with Argon2id, per-user salt, optional pepper
//! - Session keys carry 256 bits from the OS random source
//! - Unknown user, wrong password, and bad session are indistinguishable
//!   to the client

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::session_store::SessionStore;
pub use error::{AuthError, AuthResult};
pub use infra::{memory::InMemoryUserRepository, sqlite::SqliteUserRepository};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
