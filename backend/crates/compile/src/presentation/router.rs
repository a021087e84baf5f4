//! Compile Router

use axum::{Router, routing::post};

use crate::application::compile::SessionAuthority;
use crate::presentation::handlers::{self, CompileAppState};

/// Create the compile router
///
/// Mount under `/api`.
pub fn compile_router<S>(state: CompileAppState<S>) -> Router
where
    S: SessionAuthority + 'static,
{
    Router::new()
        .route("/compile/{language}", post(handlers::compile::<S>))
        .route("/run/{language}", post(handlers::run::<S>))
        .route("/test/{language}", post(handlers::test::<S>))
        .with_state(state)
}
