//! Administrator Provisioning
//!
//! Ensures the built-in administrator (id 0) exists at startup. There is no
//! default password: it comes from configuration or is generated once.

use platform::crypto::random_token;
use platform::password::{ClearTextPassword, CredentialVerifier};

use crate::domain::entity::user::NewUser;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    user_id::ADMIN_USER_ID,
    user_name::{UserName, ValidationError},
};
use crate::error::AuthResult;

/// Login handle of the built-in administrator
pub const ADMIN_USER_NAME: &str = "admin";

/// Random bytes behind a generated admin password (24 base64 chars)
const GENERATED_PASSWORD_BYTES: usize = 18;

/// What provisioning did
#[derive(Debug, PartialEq, Eq)]
pub enum AdminProvisioning {
    /// Administrator row already existed; nothing changed
    AlreadyPresent,
    /// Created with the configured password
    Created,
    /// Created with a generated password the operator must record
    CreatedWithGeneratedPassword(String),
}

/// Create the administrator if missing
///
/// A configured password must satisfy the registration policy.
pub async fn provision_admin<U>(
    users: &U,
    verifier: &CredentialVerifier,
    initial_password: Option<String>,
) -> AuthResult<AdminProvisioning>
where
    U: UserRepository,
{
    if users.find_by_id(ADMIN_USER_ID).await?.is_some() {
        tracing::debug!("Administrator already provisioned");
        return Ok(AdminProvisioning::AlreadyPresent);
    }

    let (password, outcome) = match initial_password {
        Some(raw) => (ClearTextPassword::new(raw)?, AdminProvisioning::Created),
        None => {
            let generated = random_token(GENERATED_PASSWORD_BYTES)?;
            (
                ClearTextPassword::normalized(generated.clone()),
                AdminProvisioning::CreatedWithGeneratedPassword(generated),
            )
        }
    };

    let credential = verifier.create_credential(&password)?;
    let user_name = UserName::parse(ADMIN_USER_NAME).map_err(ValidationError::from)?;

    users
        .insert(NewUser {
            user_id: Some(ADMIN_USER_ID),
            user_name,
            credential,
            is_admin: true,
        })
        .await?;

    tracing::info!(user_id = %ADMIN_USER_ID, "Administrator provisioned");
    Ok(outcome)
}
