//! Resource Errors
//!
//! Failures of local resources that both the auth and compile crates can hit:
//! the operating-system random source and the working filesystem.

use std::path::PathBuf;

use thiserror::Error;

use super::app_error::AppError;
use super::kind::ErrorKind;

/// Local resource failure
#[derive(Debug, Clone, Error)]
pub enum ResourceError {
    /// The OS random source could not deliver the requested bytes.
    /// Never substituted with weaker randomness.
    #[error("Random source exhausted: {0}")]
    RandomSourceExhausted(String),

    /// A path needed by the request exists and cannot be claimed
    #[error("File conflict at {}", .0.display())]
    FileConflict(PathBuf),
}

impl ResourceError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResourceError::RandomSourceExhausted(_) => ErrorKind::ServiceUnavailable,
            ResourceError::FileConflict(_) => ErrorKind::Conflict,
        }
    }
}

impl From<ResourceError> for AppError {
    fn from(err: ResourceError) -> Self {
        // Paths and RNG details stay in logs, not in responses
        let message = match &err {
            ResourceError::RandomSourceExhausted(_) => "Temporarily unable to issue credentials",
            ResourceError::FileConflict(_) => "Working file is already in use",
        };
        AppError::new(err.kind(), message).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_error_kinds() {
        let err = ResourceError::RandomSourceExhausted("entropy".into());
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);

        let err = ResourceError::FileConflict(PathBuf::from("/tmp/main.odin"));
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(err.to_string().contains("/tmp/main.odin"));
    }

    #[test]
    fn test_resource_error_hides_path_from_app_error() {
        let app: AppError = ResourceError::FileConflict(PathBuf::from("/srv/secret")).into();
        assert_eq!(app.status_code(), 409);
        assert!(!app.message().contains("/srv/secret"));
    }
}
