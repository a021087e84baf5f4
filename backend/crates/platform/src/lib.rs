//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (OS randomness, SHA-256, Base64, constant-time compare)
//! - Credential derivation and verification (Argon2id)

pub mod crypto;
pub mod password;
