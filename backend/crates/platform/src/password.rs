//! Password Hashing and Verification
//!
//! Salted credential derivation with:
//! - Argon2id key derivation (memory-hard, recommended by OWASP)
//! - Raw key + salt storage (the repository keeps both columns)
//! - Optional pepper, passed to Argon2 as its secret input
//! - Zeroization of clear text passwords
//! - Constant-time key comparison
//!
//! ## Security Features
//! - Memory-hard hashing prevents GPU/ASIC attacks
//! - Salts come from the OS random source; exhaustion is an error, never a weak salt
//! - NIST SP 800-63B policy checks on registration

use std::fmt;

use argon2::{Algorithm, Argon2, Params, Version};
use kernel::error::resource::ResourceError;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::crypto::{constant_time_eq, random_bytes};

// ============================================================================
// Constants
// ============================================================================

/// Minimum password length (NIST: SHALL be at least 8)
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length (NIST: SHOULD permit at least 64)
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Salt length in bytes (128 bits)
pub const SALT_LENGTH: usize = 16;

/// Derived key length in bytes
pub const KEY_LENGTH: usize = 64;

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    #[error("Password contains invalid control characters")]
    InvalidCharacter,

    #[error("Password is too common or follows a predictable pattern")]
    CommonPattern,
}

/// Credential derivation errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// Argon2 rejected the parameters or inputs
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// No salt could be drawn
    #[error(transparent)]
    RandomSource(#[from] ResourceError),
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// ## Security
/// - Implements `Zeroize` and `ZeroizeOnDrop`
/// - Does not implement `Clone` to prevent accidental copies
/// - Debug output is redacted
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Create a new clear text password, enforcing the registration policy
    ///
    /// Validates against NIST SP 800-63B requirements:
    /// - Minimum 8 characters
    /// - Maximum 128 characters
    /// - No control characters
    /// - Not empty/whitespace only
    ///
    /// Unicode is normalized using NFKC before validation.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let password = Self::normalized(raw);
        let normalized = password.0.as_str();

        if normalized.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        // NIST: Count Unicode code points (not bytes)
        let char_count = normalized.chars().count();

        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if normalized
            .chars()
            .any(|ch| ch.is_control() && ch != '\t' && ch != '\n')
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        if is_common_pattern(normalized) {
            return Err(PasswordPolicyError::CommonPattern);
        }

        Ok(password)
    }

    /// Normalize without policy checks
    ///
    /// Used for login attempts (policy results must not leak through the
    /// sign-in path) and for secrets the server generated itself.
    pub fn normalized(raw: String) -> Self {
        let mut raw = raw;
        let normalized: String = raw.nfkc().collect();
        raw.zeroize();
        Self(normalized)
    }

    /// Get the password as bytes for hashing
    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Derived credential (safe to store)
// ============================================================================

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory in KiB
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    /// 64 MiB, one pass, four lanes
    fn default() -> Self {
        Self {
            memory_kib: 64 * 1024,
            iterations: 1,
            parallelism: 4,
        }
    }
}

impl KdfParams {
    /// Cheapest parameters Argon2 accepts. Tests and local tooling only.
    pub const fn minimal() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST,
            iterations: 1,
            parallelism: 1,
        }
    }
}

/// Derived key and the salt it was derived with
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub key: Vec<u8>,
    pub salt: Vec<u8>,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("key", &"[HASH]")
            .field("salt_len", &self.salt.len())
            .finish()
    }
}

// ============================================================================
// Credential Verifier
// ============================================================================

/// Derives and checks salted password keys
///
/// ## Examples
/// ```rust
/// use platform::password::{ClearTextPassword, CredentialVerifier, KdfParams};
///
/// let verifier = CredentialVerifier::new(KdfParams::minimal(), None).unwrap();
/// let password = ClearTextPassword::normalized("correct horse".to_string());
/// let credential = verifier.create_credential(&password).unwrap();
///
/// assert!(verifier.verify(&password, &credential.key, &credential.salt));
/// ```
#[derive(Clone)]
pub struct CredentialVerifier {
    params: Params,
    pepper: Option<Zeroizing<Vec<u8>>>,
}

impl CredentialVerifier {
    /// Create a verifier, validating the cost parameters up front
    pub fn new(params: KdfParams, pepper: Option<Vec<u8>>) -> Result<Self, PasswordHashError> {
        let params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            Some(KEY_LENGTH),
        )
        .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

        Ok(Self {
            params,
            pepper: pepper.map(Zeroizing::new),
        })
    }

    /// Deterministic, salt-dependent key derivation
    pub fn derive(
        &self,
        password: &ClearTextPassword,
        salt: &[u8],
    ) -> Result<Vec<u8>, PasswordHashError> {
        let argon2 = match &self.pepper {
            Some(pepper) => Argon2::new_with_secret(
                pepper.as_slice(),
                Algorithm::Argon2id,
                Version::V0x13,
                self.params.clone(),
            )
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?,
            None => Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone()),
        };

        let mut key = vec![0u8; KEY_LENGTH];
        argon2
            .hash_password_into(password.as_bytes(), salt, &mut key)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;
        Ok(key)
    }

    /// Draw a fresh salt and derive the key for `password`
    pub fn create_credential(
        &self,
        password: &ClearTextPassword,
    ) -> Result<Credential, PasswordHashError> {
        let salt = random_bytes(SALT_LENGTH)?;
        let key = self.derive(password, &salt)?;
        Ok(Credential { key, salt })
    }

    /// Recompute the key and compare against the stored one
    ///
    /// Wrong passwords and malformed stored salts both yield `false`.
    pub fn verify(&self, password: &ClearTextPassword, key: &[u8], salt: &[u8]) -> bool {
        match self.derive(password, salt) {
            Ok(candidate) => constant_time_eq(&candidate, key),
            Err(_) => false,
        }
    }

    /// Spend the cost of one derivation without a stored credential
    ///
    /// Sign-in calls this for unknown users so that "no such user" and
    /// "wrong password" take the same time.
    pub fn equalize_timing(&self, password: &ClearTextPassword) {
        let _ = self.derive(password, &[0u8; SALT_LENGTH]);
    }
}

impl fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .field("p_cost", &self.params.p_cost())
            .field("pepper", &self.pepper.is_some())
            .finish()
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Check for common weak patterns
fn is_common_pattern(password: &str) -> bool {
    let lower = password.to_lowercase();

    // All the same character (e.g., "aaaaaaaa")
    let mut chars = lower.chars();
    if let Some(first) = chars.next() {
        if chars.all(|c| c == first) {
            return true;
        }
    }

    if is_sequential_numbers(&lower) {
        return true;
    }

    const KEYBOARD_PATTERNS: &[&str] = &["qwerty", "asdfgh", "zxcvbn", "qazwsx", "1qaz2wsx"];

    if KEYBOARD_PATTERNS.iter().any(|pattern| lower.contains(pattern)) {
        return true;
    }

    const COMMON_PASSWORDS: &[&str] = &[
        "password",
        "password1",
        "password123",
        "abcdefgh",
        "letmein1",
        "welcome1",
        "admin123",
        "iloveyou",
        "sunshine",
        "princess",
        "football",
        "baseball",
        "trustno1",
    ];

    COMMON_PASSWORDS.contains(&lower.as_str())
}

/// Check if string is sequential numbers
fn is_sequential_numbers(s: &str) -> bool {
    let digits: Vec<u32> = s.chars().filter_map(|c| c.to_digit(10)).collect();

    // Only meaningful when the password is mostly digits
    if digits.len() < 4 || digits.len() * 2 < s.chars().count() {
        return false;
    }

    let is_ascending = digits
        .windows(2)
        .all(|w| w[1] == w[0] + 1 || (w[0] == 9 && w[1] == 0));

    let is_descending = digits
        .windows(2)
        .all(|w| w[0] == w[1] + 1 || (w[0] == 0 && w[1] == 9));

    is_ascending || is_descending
}

// ============================================================================
// Tests
// ============================================================================
