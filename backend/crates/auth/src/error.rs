//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind, resource::ResourceError};
use platform::password::{PasswordHashError, PasswordPolicyError};
use thiserror::Error;

use crate::domain::value_object::user_name::ValidationError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Body shared by every credential and session failure
const AUTHENTICATION_FAILED: &str = "Authentication failed";

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown user or wrong password (deliberately not distinguished)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Session key unknown, ended, or owned by someone else
    #[error("Session not found")]
    InvalidSession,

    /// Session existed but its TTL has passed
    #[error("Session expired")]
    Expired,

    /// Malformed request data
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Password rejected by the registration policy
    #[error("Password validation failed: {0}")]
    PasswordPolicy(#[from] PasswordPolicyError),

    /// Authenticated, but the operation needs an administrator
    #[error("Administrator privileges required")]
    Forbidden,

    /// User name already exists
    #[error("User name already exists")]
    UserNameTaken,

    /// Random source or filesystem failure
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials | AuthError::InvalidSession | AuthError::Expired => {
                ErrorKind::Unauthorized
            }
            AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::PasswordPolicy(_) => ErrorKind::UnprocessableEntity,
            AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::UserNameTaken => ErrorKind::Conflict,
            AuthError::Resource(e) => e.kind(),
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Whether this is one of the anti-enumeration failures
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials | AuthError::InvalidSession | AuthError::Expired
        )
    }

    /// Convert to AppError
    ///
    /// Credential and session failures collapse to one message; the
    /// distinction only survives in logs.
    pub fn to_app_error(&self) -> AppError {
        match self {
            e if e.is_authentication_failure() => AppError::unauthorized(AUTHENTICATION_FAILED),
            AuthError::Resource(e) => AppError::new(e.kind(), "Temporarily unavailable")
                .with_action("Please try again later"),
            AuthError::Database(_) | AuthError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            other => AppError::new(other.kind(), other.to_string()),
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::Resource(e) => {
                tracing::error!(error = %e, "Auth resource failure");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::Forbidden => {
                tracing::warn!("Privileged operation refused");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        err.to_app_error()
    }
}

impl From<PasswordHashError> for AuthError {
    fn from(err: PasswordHashError) -> Self {
        match err {
            PasswordHashError::RandomSource(e) => AuthError::Resource(e),
            PasswordHashError::HashingFailed(msg) => AuthError::Internal(msg),
        }
    }
}

impl From<tokio::task::JoinError> for AuthError {
    fn from(err: tokio::task::JoinError) -> Self {
        AuthError::Internal(format!("Credential task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::user_name::UserNameError;

    #[test]
    fn test_auth_failures_are_indistinguishable() {
        let bodies: Vec<String> = [
            AuthError::InvalidCredentials,
            AuthError::InvalidSession,
            AuthError::Expired,
        ]
        .iter()
        .map(|e| {
            let app = e.to_app_error();
            assert_eq!(app.status_code(), 401);
            app.message().to_string()
        })
        .collect();

        assert!(bodies.iter().all(|b| b == AUTHENTICATION_FAILED));
    }

    #[test]
    fn test_validation_is_distinguishable_from_auth_failure() {
        let err = AuthError::from(ValidationError::MalformedUsername(UserNameError::Empty));
        assert!(!err.is_authentication_failure());
        assert_eq!(err.to_app_error().status_code(), 400);
    }

    #[test]
    fn test_random_source_maps_to_resource() {
        let err: AuthError =
            PasswordHashError::RandomSource(ResourceError::RandomSourceExhausted("eof".into()))
                .into();
        assert!(matches!(err, AuthError::Resource(_)));
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
    }

    #[test]
    fn test_forbidden_is_not_an_authentication_failure() {
        let err = AuthError::Forbidden;
        assert!(!err.is_authentication_failure());
        assert_eq!(err.to_app_error().status_code(), 403);
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let err = AuthError::Internal("argon2 exploded".into());
        assert!(!err.to_app_error().message().contains("argon2"));
    }
}
