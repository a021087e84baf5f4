//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{SessionStore, SignUpInput, SignUpUseCase};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::session_key::SessionKey;
use crate::error::AuthResult;
use crate::presentation::dto::{
    LoginRequest, LoginResponse, LogoutRequest, SessionCredentials, SessionStatusResponse,
    SignUpRequest, SignUpResponse,
};

/// Shared state for auth handlers
pub struct AuthAppState<R>
where
    R: UserRepository + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub sessions: Arc<SessionStore<R>>,
    pub config: Arc<AuthConfig>,
}

// Manual impl: derive would demand `R: Clone`
impl<R> Clone for AuthAppState<R>
where
    R: UserRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            sessions: Arc::clone(&self.sessions),
            config: Arc::clone(&self.config),
        }
    }
}

// ============================================================================
// Sign Up
// ============================================================================

/// POST /api/auth/signup
///
/// Requires an administrator session in `auth`.
pub async fn sign_up<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<SignUpRequest>,
) -> AuthResult<(StatusCode, Json<SignUpResponse>)>
where
    R: UserRepository + Send + Sync + 'static,
{
    let registrar = state.sessions.authorize(
        &req.auth.user_name,
        &SessionKey::from_client(req.auth.session_key),
    )?;

    let use_case = SignUpUseCase::new(state.repo.clone(), state.sessions.verifier());

    let input = SignUpInput {
        registrar: registrar.user_id,
        user_name: req.user_name,
        password: req.password,
    };

    let output = use_case.execute(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            user_id: output.user_id.as_i64(),
        }),
    ))
}

// ============================================================================
// Login / Logout
// ============================================================================

/// POST /api/auth/login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Json<LoginResponse>>
where
    R: UserRepository + Send + Sync + 'static,
{
    let key = state
        .sessions
        .begin_session(&req.user_name, req.password, state.config.session_ttl)
        .await?;

    Ok(Json(LoginResponse {
        session_key: key.into_inner(),
        time_to_live_ms: state.config.session_ttl_ms(),
    }))
}

/// POST /api/auth/logout
pub async fn logout<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<LogoutRequest>,
) -> StatusCode
where
    R: UserRepository + Send + Sync + 'static,
{
    state
        .sessions
        .end_session(&SessionKey::from_client(req.session_key));
    StatusCode::NO_CONTENT
}

// ============================================================================
// Session Status
// ============================================================================

/// POST /api/auth/status
///
/// Never fails on a bad session; reports `authenticated: false` instead.
pub async fn session_status<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<SessionCredentials>,
) -> Json<SessionStatusResponse>
where
    R: UserRepository + Send + Sync + 'static,
{
    let key = SessionKey::from_client(req.session_key);
    let now = Utc::now();

    match state.sessions.authorize_at(&req.user_name, &key, now) {
        Ok(session) => Json(SessionStatusResponse {
            authenticated: true,
            user_id: Some(session.user_id.as_i64()),
            expires_in_ms: Some(session.remaining_ms(now)),
        }),
        Err(e) => {
            e.log();
            Json(SessionStatusResponse::unauthenticated())
        }
    }
}
