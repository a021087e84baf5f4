//! User Entity
//!
//! A registered account and the credential derived from its password.

use chrono::{DateTime, Utc};
use platform::password::Credential;

use crate::domain::value_object::{user_id::UserId, user_name::UserName};

/// Persisted user
#[derive(Debug, Clone)]
pub struct User {
    /// Integer identity assigned by the store
    pub user_id: UserId,
    /// Unique login handle
    pub user_name: UserName,
    /// Argon2id key and salt
    pub credential: Credential,
    /// Built-in administrator flag
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// User about to be inserted
///
/// `user_id` is `None` unless a fixed identity is required (the admin account).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_id: Option<UserId>,
    pub user_name: UserName,
    pub credential: Credential,
    pub is_admin: bool,
}

impl NewUser {
    /// Regular self-registered account
    pub fn new(user_name: UserName, credential: Credential) -> Self {
        Self {
            user_id: None,
            user_name,
            credential,
            is_admin: false,
        }
    }

    /// Materialize with the identity the store assigned
    pub fn into_user(self, user_id: UserId, created_at: DateTime<Utc>) -> User {
        User {
            user_id,
            user_name: self.user_name,
            credential: self.credential,
            is_admin: self.is_admin,
            created_at,
        }
    }
}
