//! Repository Traits
//!
//! The user store is an external collaborator: lookup by name or id, and
//! insert. Implementations live in the infrastructure layer.

use crate::domain::entity::user::{NewUser, User};
use crate::domain::value_object::{user_id::UserId, user_name::UserName};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a user, returning it with its assigned identity
    async fn insert(&self, user: NewUser) -> AuthResult<User>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>>;

    /// Find user by user name
    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>>;

    /// Check if user name exists
    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool>;
}
