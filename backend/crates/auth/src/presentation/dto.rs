//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

// ============================================================================
// Sign Up
// ============================================================================

/// Sign up request
///
/// `auth` is the registering administrator's session.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub auth: SessionCredentials,
    #[serde(alias = "username", alias = "user_name")]
    pub user_name: String,
    pub password: String,
}

/// Sign up response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResponse {
    pub user_id: i64,
}

// ============================================================================
// Login / Logout
// ============================================================================

/// Login request
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(alias = "username", alias = "user_name")]
    pub user_name: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub session_key: String,
    /// Session lifetime from now, in milliseconds
    pub time_to_live_ms: i64,
}

/// Logout request
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    #[serde(alias = "session_key")]
    pub session_key: String,
}

// ============================================================================
// Session Status
// ============================================================================

/// Credentials carried by every authenticated request
///
/// The snake_case spellings of earlier clients are accepted too.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCredentials {
    #[serde(alias = "username", alias = "user_name")]
    pub user_name: String,
    #[serde(alias = "session_key")]
    pub session_key: String,
}

/// Session status response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in_ms: Option<i64>,
}

impl SessionStatusResponse {
    pub fn unauthenticated() -> Self {
        Self {
            authenticated: false,
            user_id: None,
            expires_in_ms: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_is_camel_case() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"userName":"alice","password":"pw"}"#).unwrap();
        assert_eq!(req.user_name, "alice");
    }

    #[test]
    fn test_snake_case_spellings_accepted() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"username":"alice","password":"pw"}"#).unwrap();
        assert_eq!(req.user_name, "alice");

        let creds: SessionCredentials =
            serde_json::from_str(r#"{"username":"alice","session_key":"k"}"#).unwrap();
        assert_eq!(creds.user_name, "alice");
        assert_eq!(creds.session_key, "k");

        let logout: LogoutRequest = serde_json::from_str(r#"{"session_key":"k"}"#).unwrap();
        assert_eq!(logout.session_key, "k");
    }

    #[test]
    fn test_sign_up_request_carries_registrar_session() {
        let req: SignUpRequest = serde_json::from_str(
            r#"{"auth":{"userName":"admin","sessionKey":"k"},"userName":"alice","password":"pw"}"#,
        )
        .unwrap();
        assert_eq!(req.auth.user_name, "admin");
        assert_eq!(req.user_name, "alice");
    }

    #[test]
    fn test_login_response_shape() {
        let json = serde_json::to_value(LoginResponse {
            session_key: "k".into(),
            time_to_live_ms: 10_000,
        })
        .unwrap();
        assert_eq!(json["sessionKey"], "k");
        assert_eq!(json["timeToLiveMs"], 10_000);
    }

    #[test]
    fn test_unauthenticated_status_omits_fields() {
        let json = serde_json::to_string(&SessionStatusResponse::unauthenticated()).unwrap();
        assert_eq!(json, r#"{"authenticated":false}"#);
    }
}
