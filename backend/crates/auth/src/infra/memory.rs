//! In-Memory Repository Implementation
//!
//! Process-local user store for tests and ephemeral deployments.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use crate::domain::entity::user::{NewUser, User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{user_id::UserId, user_name::UserName};
use crate::error::{AuthError, AuthResult};

/// Users keyed by id; ids are assigned from 1 upward
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<BTreeMap<i64, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<i64, User>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: NewUser) -> AuthResult<User> {
        let mut users = self.lock();

        if users.values().any(|u| u.user_name == user.user_name) {
            return Err(AuthError::UserNameTaken);
        }

        let id = match user.user_id {
            Some(id) if users.contains_key(&id.as_i64()) => {
                return Err(AuthError::Internal(format!("User id {id} already assigned")));
            }
            Some(id) => id.as_i64(),
            None => users.keys().next_back().map_or(1, |last| (last + 1).max(1)),
        };

        let user = user.into_user(UserId::from_i64(id), Utc::now());
        users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        Ok(self.lock().get(&user_id.as_i64()).cloned())
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>> {
        Ok(self
            .lock()
            .values()
            .find(|u| &u.user_name == user_name)
            .cloned())
    }

    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool> {
        Ok(self.lock().values().any(|u| &u.user_name == user_name))
    }
}

#[cfg(test)]
mod tests {
    use platform::password::Credential;

    use super::*;
    use crate::domain::value_object::user_id::ADMIN_USER_ID;

    fn new_user(name: &str) -> NewUser {
        NewUser::new(
            UserName::parse(name).unwrap(),
            Credential {
                key: vec![1; 64],
                salt: vec![2; 16],
            },
        )
    }

    #[tokio::test]
    async fn test_ids_start_at_one() {
        let repo = InMemoryUserRepository::new();
        let alice = repo.insert(new_user("alice")).await.unwrap();
        let bob = repo.insert(new_user("bob")).await.unwrap();
        assert_eq!(alice.user_id.as_i64(), 1);
        assert_eq!(bob.user_id.as_i64(), 2);
    }

    #[tokio::test]
    async fn test_admin_id_does_not_shift_sequence() {
        let repo = InMemoryUserRepository::new();
        let mut admin = new_user("admin");
        admin.user_id = Some(ADMIN_USER_ID);
        repo.insert(admin).await.unwrap();

        let alice = repo.insert(new_user("alice")).await.unwrap();
        assert_eq!(alice.user_id.as_i64(), 1);
    }

    #[tokio::test]
    async fn test_lookup() {
        let repo = InMemoryUserRepository::new();
        repo.insert(new_user("alice")).await.unwrap();

        let name = UserName::parse("alice").unwrap();
        assert!(repo.exists_by_user_name(&name).await.unwrap());
        assert!(repo.find_by_user_name(&name).await.unwrap().is_some());

        let other = UserName::parse("Alice").unwrap();
        assert!(!repo.exists_by_user_name(&other).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.insert(new_user("alice")).await.unwrap();
        assert!(matches!(
            repo.insert(new_user("alice")).await,
            Err(AuthError::UserNameTaken)
        ));
    }
}
