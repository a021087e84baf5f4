//! Sign Up Use Case
//!
//! Creates a new user account on behalf of an administrator.

use std::sync::Arc;

use platform::password::{ClearTextPassword, CredentialVerifier};

use crate::domain::entity::user::NewUser;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    user_id::UserId,
    user_name::{UserName, ValidationError},
};
use crate::error::{AuthError, AuthResult};

/// Sign up input
pub struct SignUpInput {
    /// Owner of the session that asked for the account
    pub registrar: UserId,
    pub user_name: String,
    pub password: String,
}

/// Sign up output
#[derive(Debug)]
pub struct SignUpOutput {
    pub user_id: UserId,
}

/// Sign up use case
pub struct SignUpUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    verifier: Arc<CredentialVerifier>,
}

impl<U> SignUpUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, verifier: Arc<CredentialVerifier>) -> Self {
        Self {
            user_repo,
            verifier,
        }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<SignUpOutput> {
        // Only administrators register accounts
        let registrar = self.user_repo.find_by_id(input.registrar).await?;
        if !registrar.is_some_and(|user| user.is_admin) {
            tracing::warn!(registrar = %input.registrar, "Sign-up by non-administrator refused");
            return Err(AuthError::Forbidden);
        }

        // Validate user name
        let user_name = UserName::for_registration(input.user_name).map_err(ValidationError::from)?;

        // Check if user name is taken
        if self.user_repo.exists_by_user_name(&user_name).await? {
            return Err(AuthError::UserNameTaken);
        }

        // Validate and derive password key
        let password = ClearTextPassword::new(input.password)?;
        let verifier = Arc::clone(&self.verifier);
        let credential =
            tokio::task::spawn_blocking(move || verifier.create_credential(&password)).await??;

        // Persist (a concurrent sign-up may still win the name; the store reports it)
        let user = self
            .user_repo
            .insert(NewUser::new(user_name, credential))
            .await?;

        tracing::info!(
            user_id = %user.user_id,
            user_name = %user.user_name,
            registrar = %input.registrar,
            "User signed up"
        );

        Ok(SignUpOutput {
            user_id: user.user_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use platform::password::KdfParams;

    use super::*;
    use crate::application::provision_admin;
    use crate::domain::value_object::user_id::ADMIN_USER_ID;
    use crate::infra::memory::InMemoryUserRepository;

    async fn use_case() -> (SignUpUseCase<InMemoryUserRepository>, Arc<InMemoryUserRepository>) {
        let repo = Arc::new(InMemoryUserRepository::new());
        let verifier = Arc::new(CredentialVerifier::new(KdfParams::minimal(), None).unwrap());
        provision_admin(
            repo.as_ref(),
            &verifier,
            Some("an admin passphrase".to_string()),
        )
        .await
        .unwrap();
        (SignUpUseCase::new(Arc::clone(&repo), verifier), repo)
    }

    fn input(user_name: &str, password: &str) -> SignUpInput {
        SignUpInput {
            registrar: ADMIN_USER_ID,
            user_name: user_name.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_sign_up_stores_credential() {
        let (use_case, repo) = use_case().await;
        let output = use_case
            .execute(input("alice", "correct horse battery"))
            .await
            .unwrap();

        let user = repo.find_by_id(output.user_id).await.unwrap().unwrap();
        assert_eq!(user.user_name.as_str(), "alice");
        assert!(!user.is_admin);
        assert_eq!(user.credential.salt.len(), platform::password::SALT_LENGTH);
    }

    #[tokio::test]
    async fn test_duplicate_name() {
        let (use_case, _) = use_case().await;
        use_case
            .execute(input("alice", "correct horse battery"))
            .await
            .unwrap();

        let err = use_case
            .execute(input("alice", "another good passphrase"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserNameTaken));
    }

    #[tokio::test]
    async fn test_reserved_name() {
        let (use_case, _) = use_case().await;
        let err = use_case
            .execute(input("admin", "correct horse battery"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_weak_password() {
        let (use_case, _) = use_case().await;
        let err = use_case.execute(input("alice", "short")).await.unwrap_err();
        assert!(matches!(err, AuthError::PasswordPolicy(_)));
    }

    #[tokio::test]
    async fn test_regular_user_cannot_register_accounts() {
        let (use_case, repo) = use_case().await;
        let alice = use_case
            .execute(input("alice", "correct horse battery"))
            .await
            .unwrap();

        let err = use_case
            .execute(SignUpInput {
                registrar: alice.user_id,
                ..input("bob", "another good passphrase")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden));
        assert!(
            repo.find_by_user_name(&UserName::parse("bob").unwrap())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_unknown_registrar_is_refused() {
        let (use_case, _) = use_case().await;
        let err = use_case
            .execute(SignUpInput {
                registrar: UserId::from_i64(4242),
                ..input("alice", "correct horse battery")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden));
    }
}
