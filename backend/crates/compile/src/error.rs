//! Compile Error Types
//!
//! Integrates the compile crate's failures with `kernel::error::AppError`.

use auth::AuthError;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind, resource::ResourceError};
use serde_json::json;
use thiserror::Error;

use crate::domain::entity::ExecutionResult;
use crate::domain::registry::ResolutionError;
use crate::infra::executor::ExecutionError;

/// Compile-specific result type alias
pub type CompileResult<T> = Result<T, CompileError>;

/// Everything that can stop a compile request
#[derive(Debug, Error)]
pub enum CompileError {
    /// Session check failed
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Unknown language tag
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Spawn failure, deadline, or supervision I/O
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// Workspace path conflict or random source failure
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Submitted source exceeds the configured limit
    #[error("Source is {size} bytes, limit is {limit}")]
    SourceTooLarge { size: usize, limit: usize },

    /// Workspace filesystem error
    #[error("Workspace I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::Auth(e) => e.kind(),
            CompileError::Resolution(_) => ErrorKind::NotFound,
            CompileError::Execution(ExecutionError::SpawnFailed { .. }) => {
                ErrorKind::ServiceUnavailable
            }
            CompileError::Execution(ExecutionError::Timeout { .. }) => ErrorKind::RequestTimeout,
            CompileError::Execution(ExecutionError::Io(_)) | CompileError::Io(_) => {
                ErrorKind::InternalServerError
            }
            CompileError::Resource(e) => e.kind(),
            CompileError::SourceTooLarge { .. } => ErrorKind::PayloadTooLarge,
        }
    }

    /// Convert to AppError
    ///
    /// A timeout keeps the partial output in `details`.
    pub fn to_app_error(&self) -> AppError {
        match self {
            CompileError::Auth(e) => e.to_app_error(),
            CompileError::Resolution(e) => AppError::not_found(e.to_string())
                .with_action("Use one of the supported language tags"),
            CompileError::Execution(ExecutionError::SpawnFailed { program, .. }) => {
                AppError::service_unavailable(format!("Toolchain '{program}' is not available"))
            }
            CompileError::Execution(ExecutionError::Timeout { limit, partial }) => {
                AppError::request_timeout(format!(
                    "Execution exceeded the {} second limit",
                    limit.as_secs_f64()
                ))
                .with_details(partial_output(partial))
            }
            CompileError::Execution(ExecutionError::Io(_)) | CompileError::Io(_) => {
                AppError::internal("Internal server error")
            }
            CompileError::Resource(e) => e.clone().into(),
            CompileError::SourceTooLarge { limit, .. } => AppError::new(
                ErrorKind::PayloadTooLarge,
                format!("Source code exceeds {limit} bytes"),
            ),
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            CompileError::Auth(e) => e.log(),
            CompileError::Execution(ExecutionError::Io(e)) | CompileError::Io(e) => {
                tracing::error!(error = %e, "Compile I/O error");
            }
            CompileError::Resource(e) => {
                tracing::error!(error = %e, "Compile resource failure");
            }
            CompileError::Execution(e @ ExecutionError::SpawnFailed { .. }) => {
                tracing::error!(error = %e, "Toolchain spawn failed");
            }
            CompileError::Execution(e @ ExecutionError::Timeout { .. }) => {
                tracing::warn!(error = %e, "Compile request timed out");
            }
            _ => {
                tracing::debug!(error = %self, "Compile request rejected");
            }
        }
    }
}

fn partial_output(partial: &ExecutionResult) -> serde_json::Value {
    json!({
        "stdout": partial.stdout.to_text(),
        "stderr": partial.stderr.to_text(),
        "stdoutTruncated": partial.stdout.truncated,
        "stderrTruncated": partial.stderr.truncated,
        "elapsedMs": partial.elapsed_ms(),
    })
}

impl IntoResponse for CompileError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<CompileError> for AppError {
    fn from(err: CompileError) -> Self {
        err.to_app_error()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use super::*;
    use crate::domain::entity::CapturedOutput;

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(CompileError, u16)> = vec![
            (AuthError::Expired.into(), 401),
            (ResolutionError::UnsupportedLanguage("cobol".into()).into(), 404),
            (
                ExecutionError::SpawnFailed {
                    program: "odin".into(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                }
                .into(),
                503,
            ),
            (ResourceError::FileConflict(PathBuf::from("/w/main.odin")).into(), 409),
            (CompileError::SourceTooLarge { size: 10, limit: 5 }, 413),
        ];

        for (err, status) in cases {
            assert_eq!(err.to_app_error().status_code(), status, "{err}");
        }
    }

    #[test]
    fn test_timeout_carries_partial_output() {
        let err = CompileError::from(ExecutionError::Timeout {
            limit: Duration::from_secs(30),
            partial: ExecutionResult {
                succeeded: false,
                exit_code: None,
                stdout: CapturedOutput {
                    bytes: b"half".to_vec(),
                    truncated: false,
                },
                stderr: CapturedOutput::default(),
                elapsed: Duration::from_secs(30),
            },
        });

        let app = err.to_app_error();
        assert_eq!(app.status_code(), 408);
        let details = app.details().unwrap();
        assert_eq!(details["stdout"], "half");
        assert_eq!(details["elapsedMs"], 30_000);
    }

    #[test]
    fn test_conflict_path_not_exposed() {
        let err = CompileError::from(ResourceError::FileConflict(PathBuf::from("/secret/dir")));
        assert!(!err.to_app_error().message().contains("/secret"));
    }
}
