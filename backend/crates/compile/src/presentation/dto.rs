//! API DTOs (Data Transfer Objects)

use auth::presentation::dto::SessionCredentials;
use serde::{Deserialize, Serialize};

use crate::domain::entity::ExecutionResult;

// ============================================================================
// Requests
// ============================================================================

/// Compile (build only) request
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileRequest {
    pub auth: SessionCredentials,
    #[serde(alias = "source_code")]
    pub source_code: String,
}

/// Run or test request
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub auth: SessionCredentials,
    #[serde(alias = "source_code")]
    pub source_code: String,
    #[serde(default)]
    pub args: Vec<String>,
}

// ============================================================================
// Responses
// ============================================================================

/// Outcome of one process run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub stdout_truncated: bool,
    pub stderr_truncated: bool,
    pub elapsed_ms: u64,
}

impl From<&ExecutionResult> for ExecutionResponse {
    fn from(result: &ExecutionResult) -> Self {
        Self {
            success: result.succeeded,
            exit_code: result.exit_code,
            stdout: result.stdout.to_text(),
            stderr: result.stderr.to_text(),
            stdout_truncated: result.stdout.truncated,
            stderr_truncated: result.stderr.truncated,
            elapsed_ms: result.elapsed_ms(),
        }
    }
}

/// Build followed by run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResponse {
    pub build: ExecutionResponse,
    /// Absent when the build failed
    pub run: Option<ExecutionResponse>,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::entity::CapturedOutput;

    #[test]
    fn test_snake_case_compile_request() {
        let req: RunRequest = serde_json::from_str(
            r#"{"auth":{"username":"admin","session_key":"k"},"source_code":"package main","args":["-v"]}"#,
        )
        .unwrap();
        assert_eq!(req.auth.user_name, "admin");
        assert_eq!(req.auth.session_key, "k");
        assert_eq!(req.source_code, "package main");
        assert_eq!(req.args, vec!["-v".to_string()]);
    }

    #[test]
    fn test_compile_request_shape() {
        let req: CompileRequest = serde_json::from_str(
            r#"{"auth":{"userName":"admin","sessionKey":"k"},"sourceCode":"package main"}"#,
        )
        .unwrap();
        assert_eq!(req.auth.user_name, "admin");
        assert_eq!(req.source_code, "package main");
    }

    #[test]
    fn test_run_request_args_default() {
        let req: RunRequest = serde_json::from_str(
            r#"{"auth":{"userName":"admin","sessionKey":"k"},"sourceCode":""}"#,
        )
        .unwrap();
        assert!(req.args.is_empty());
    }

    #[test]
    fn test_execution_response_shape() {
        let result = ExecutionResult {
            succeeded: false,
            exit_code: None,
            stdout: CapturedOutput {
                bytes: b"out".to_vec(),
                truncated: true,
            },
            stderr: CapturedOutput::default(),
            elapsed: Duration::from_millis(12),
        };

        let json = serde_json::to_value(ExecutionResponse::from(&result)).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["stdout"], "out");
        assert_eq!(json["stdoutTruncated"], true);
        assert_eq!(json["elapsedMs"], 12);
        assert!(json.get("exitCode").is_none());
    }
}
