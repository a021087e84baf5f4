//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::password::{CredentialVerifier, KdfParams, PasswordHashError};

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Lifetime of a session from sign-in
    pub session_ttl: Duration,
    /// Argon2id cost parameters
    pub kdf: KdfParams,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Period of the background expiry sweep (`None` = lazy eviction only)
    pub sweep_interval: Option<Duration>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(10),
            kdf: KdfParams::default(),
            password_pepper: None,
            sweep_interval: Some(Duration::from_secs(60)),
        }
    }
}

impl AuthConfig {
    /// Config for development: lazy eviction only
    pub fn development() -> Self {
        Self {
            sweep_interval: None,
            ..Default::default()
        }
    }

    /// Get session TTL in milliseconds
    pub fn session_ttl_ms(&self) -> i64 {
        self.session_ttl.as_millis() as i64
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    /// Build the credential verifier these settings describe
    pub fn credential_verifier(&self) -> Result<CredentialVerifier, PasswordHashError> {
        CredentialVerifier::new(self.kdf, self.password_pepper.clone())
    }
}
