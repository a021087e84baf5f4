//! SQLite Repository Implementation

use chrono::{DateTime, Utc};
use platform::crypto::{from_base64, to_base64};
use platform::password::Credential;
use sqlx::SqlitePool;

use crate::domain::entity::user::{NewUser, User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{user_id::UserId, user_name::UserName};
use crate::error::{AuthError, AuthResult};

/// SQLite-backed user repository
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl UserRepository for SqliteUserRepository {
    async fn insert(&self, user: NewUser) -> AuthResult<User> {
        let created_at = Utc::now();

        // NULL id lets SQLite assign the next rowid
        let result = sqlx::query(
            r#"
            INSERT INTO users (
                id,
                name,
                auth_hash,
                auth_salt,
                is_admin,
                created_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.user_id.map(|id| id.as_i64()))
        .bind(user.user_name.as_str())
        .bind(to_base64(&user.credential.key))
        .bind(to_base64(&user.credential.salt))
        .bind(user.is_admin)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AuthError::UserNameTaken,
            other => AuthError::Database(other),
        })?;

        let user_id = user
            .user_id
            .unwrap_or_else(|| UserId::from_i64(result.last_insert_rowid()));

        Ok(user.into_user(user_id, created_at))
    }

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                id,
                name,
                auth_hash,
                auth_salt,
                is_admin,
                created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                id,
                name,
                auth_hash,
                auth_salt,
                is_admin,
                created_at
            FROM users
            WHERE name = ?
            "#,
        )
        .bind(user_name.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE name = ?)",
        )
        .bind(user_name.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    auth_hash: String,
    auth_salt: String,
    is_admin: bool,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let key = from_base64(&self.auth_hash)
            .map_err(|e| AuthError::Internal(format!("Invalid auth_hash for user {}: {}", self.id, e)))?;
        let salt = from_base64(&self.auth_salt)
            .map_err(|e| AuthError::Internal(format!("Invalid auth_salt for user {}: {}", self.id, e)))?;

        Ok(User {
            user_id: UserId::from_i64(self.id),
            user_name: UserName::from_db(self.name),
            credential: Credential { key, salt },
            is_admin: self.is_admin,
            created_at: self.created_at,
        })
    }
}
