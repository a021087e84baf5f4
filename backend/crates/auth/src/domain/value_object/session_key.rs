//! Session Key Value Object
//!
//! Opaque bearer token handed out on sign-in. Possession of a live key is
//! the only thing needed to act as its owner, so the raw value never shows
//! up in `Debug` output or logs.

use std::fmt;

use kernel::error::resource::ResourceError;
use platform::crypto::{fingerprint, random_token};

/// Entropy carried by a freshly generated key (256 bits)
pub const SESSION_KEY_BYTES: usize = 32;

/// Session bearer token
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionKey(String);

impl SessionKey {
    /// Draw a new key from the OS random source
    pub fn generate() -> Result<Self, ResourceError> {
        random_token(SESSION_KEY_BYTES).map(Self)
    }

    /// Wrap a key presented by a client
    ///
    /// No format check: an unknown value simply misses in the store.
    pub fn from_client(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Loggable identifier for this key
    pub fn fingerprint(&self) -> String {
        fingerprint(self.0.as_bytes())
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionKey").field(&self.fingerprint()).finish()
    }
}
