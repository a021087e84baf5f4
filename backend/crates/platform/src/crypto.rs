//! Cryptographic Utilities

use base64::{Engine, engine::general_purpose};
use kernel::error::resource::ResourceError;
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

/// Generate cryptographically secure random bytes
///
/// Fails instead of falling back to a weaker generator when the OS source
/// cannot deliver.
pub fn random_bytes(len: usize) -> Result<Vec<u8>, ResourceError> {
    let mut bytes = vec![0u8; len];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| ResourceError::RandomSourceExhausted(e.to_string()))?;
    Ok(bytes)
}

/// Random URL-safe token carrying `len` bytes of entropy
pub fn random_token(len: usize) -> Result<String, ResourceError> {
    random_bytes(len).map(|bytes| to_base64_url(&bytes))
}

/// Compute SHA-256 hash
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Short, non-reversible identifier for secrets that must show up in logs
pub fn fingerprint(data: &[u8]) -> String {
    sha256(data)[..6].iter().map(|b| format!("{:02x}", b)).collect()
}

/// Encode bytes as base64
pub fn to_base64(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

/// Decode base64 to bytes
pub fn from_base64(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(s)
}

/// Encode bytes as unpadded URL-safe base64
pub fn to_base64_url(bytes: &[u8]) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Constant-time comparison to prevent timing attacks
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_values() {
        let hash = sha256(b"");
        let expected =
            hex::decode("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
                .unwrap();
        assert_eq!(hash.to_vec(), expected);
    }

    #[test]
    fn test_random_bytes() {
        let bytes = random_bytes(32).unwrap();
        assert_eq!(bytes.len(), 32);
        assert!(bytes.iter().any(|&b| b != 0));

        assert!(random_bytes(0).unwrap().is_empty());
    }

    #[test]
    fn test_random_token_is_url_safe() {
        let token = random_token(32).unwrap();
        // 32 bytes -> 43 unpadded base64 chars
        assert_eq!(token.len(), 43);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert_ne!(token, random_token(32).unwrap());
    }

    #[test]
    fn test_fingerprint() {
        let fp = fingerprint(b"session");
        assert_eq!(fp.len(), 12);
        assert_eq!(fp, hex::encode(&sha256(b"session")[..6]));
    }

    #[test]
    fn test_base64_roundtrip() {
        let data = b"salt bytes";
        assert_eq!(from_base64(&to_base64(data)).unwrap(), data);
    }

    #[test]
    fn test_constant_time_eq() {
        let a = [1u8, 2, 3, 4];
        let b = [1u8, 2, 3, 4];
        let c = [1u8, 2, 3, 5];
        assert!(constant_time_eq(&a, &b));
        assert!(!constant_time_eq(&a, &c));
        assert!(!constant_time_eq(&a, &c[..3]));
    }
}
