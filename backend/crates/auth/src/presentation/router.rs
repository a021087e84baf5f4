//! Auth Router

use axum::{Router, routing::post};

use crate::domain::repository::UserRepository;
use crate::presentation::handlers::{self, AuthAppState};

/// Create the Auth router for any repository implementation
///
/// Mount under `/api/auth`.
pub fn auth_router<R>(state: AuthAppState<R>) -> Router
where
    R: UserRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/signup", post(handlers::sign_up::<R>))
        .route("/login", post(handlers::login::<R>))
        .route("/logout", post(handlers::logout::<R>))
        .route("/status", post(handlers::session_status::<R>))
        .with_state(state)
}
