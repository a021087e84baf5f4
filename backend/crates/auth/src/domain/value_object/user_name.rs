//! User Name Value Object
//!
//! The login handle. Unique per user, case-sensitive.
//!
//! ## Rules
//! - NFKC normalization and trimming are applied before validation
//! - Length: 2 to 32 characters
//! - Only ASCII letters, digits, `_` and `-`
//! - Reserved words are rejected at registration only, so the built-in
//!   `admin` account can still sign in

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

// ============================================================================
// Constants
// ============================================================================

/// Minimum length for user name (in characters)
pub const USER_NAME_MIN_LENGTH: usize = 2;

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 32;

/// Allowed special characters in user name
const ALLOWED_SPECIAL_CHARS: &[char] = &['_', '-'];

/// Names that self-registration cannot claim
const RESERVED_WORDS: &[&str] = &[
    "admin",
    "administrator",
    "root",
    "system",
    "superuser",
    "support",
    "api",
    "login",
    "logout",
    "signup",
    "compile",
    "run",
    "test",
    "null",
    "anonymous",
    "guest",
];

// ============================================================================
// Error Types
// ============================================================================

/// Why a user name was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserNameError {
    #[error("User name cannot be empty")]
    Empty,

    #[error("User name is too short ({length} chars, minimum {min})")]
    TooShort { length: usize, min: usize },

    #[error("User name is too long ({length} chars, maximum {max})")]
    TooLong { length: usize, max: usize },

    #[error(
        "Invalid character '{char}' at position {position}. Only a-z, A-Z, 0-9, _ and - are allowed"
    )]
    InvalidCharacter { char: char, position: usize },

    #[error("'{word}' is a reserved user name")]
    Reserved { word: String },
}

/// Request validation failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Malformed user name: {0}")]
    MalformedUsername(#[from] UserNameError),
}

// ============================================================================
// UserName Value Object
// ============================================================================

/// Validated, normalized user name
///
/// # Invariants
/// - Length between USER_NAME_MIN_LENGTH and USER_NAME_MAX_LENGTH
/// - Contains only ASCII alphanumeric and allowed special characters
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Parse a user name supplied at sign-in
    pub fn parse(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        let normalized = Self::normalize(input.as_ref());
        Self::validate(&normalized)?;
        Ok(Self(normalized))
    }

    /// Parse a user name for a new account, rejecting reserved words
    pub fn for_registration(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        let name = Self::parse(input)?;
        let lower = name.0.to_ascii_lowercase();
        if RESERVED_WORDS.contains(&lower.as_str()) {
            return Err(UserNameError::Reserved { word: name.0 });
        }
        Ok(name)
    }

    /// Create from database values (assumes already validated)
    pub fn from_db(stored: impl Into<String>) -> Self {
        Self(stored.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn normalize(input: &str) -> String {
        input.nfkc().collect::<String>().trim().to_string()
    }

    fn validate(name: &str) -> Result<(), UserNameError> {
        if name.is_empty() {
            return Err(UserNameError::Empty);
        }

        let length = name.chars().count();
        if length < USER_NAME_MIN_LENGTH {
            return Err(UserNameError::TooShort {
                length,
                min: USER_NAME_MIN_LENGTH,
            });
        }
        if length > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::TooLong {
                length,
                max: USER_NAME_MAX_LENGTH,
            });
        }

        if let Some((position, char)) = name
            .chars()
            .enumerate()
            .find(|&(_, c)| !Self::is_valid_char(c))
        {
            return Err(UserNameError::InvalidCharacter { char, position });
        }

        Ok(())
    }

    #[inline]
    fn is_valid_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || ALLOWED_SPECIAL_CHARS.contains(&c)
    }
}

impl fmt::Debug for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserName").field(&self.0).finish()
    }
}

impl TryFrom<String> for UserName {
    type Error = UserNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<UserName> for String {
    fn from(name: UserName) -> Self {
        name.0
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
