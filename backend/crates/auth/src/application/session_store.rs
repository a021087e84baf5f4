//! Session Store
//!
//! Authenticates users against the user repository and tracks the
//! resulting sessions in process memory.
//!
//! ## Concurrency
//! The session map sits behind a single mutex that is only held for map
//! operations. Repository lookups and key derivation happen before the lock
//! is taken, so a slow sign-in never blocks validation of other sessions.
//! Expired entries are evicted lazily on lookup and periodically by
//! [`SessionStore::spawn_sweeper`].

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use platform::password::{ClearTextPassword, CredentialVerifier};
use tokio::task::JoinHandle;

use crate::domain::entity::{session::Session, user::User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    session_key::SessionKey, user_id::UserId, user_name::UserName,
    user_name::ValidationError,
};
use crate::error::{AuthError, AuthResult};

/// In-memory session registry
pub struct SessionStore<U> {
    users: Arc<U>,
    verifier: Arc<CredentialVerifier>,
    sessions: Mutex<HashMap<SessionKey, Session>>,
}

impl<U> SessionStore<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(users: Arc<U>, verifier: Arc<CredentialVerifier>) -> Self {
        Self {
            users,
            verifier,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Verifier shared with registration so both derive keys the same way
    pub fn verifier(&self) -> Arc<CredentialVerifier> {
        Arc::clone(&self.verifier)
    }

    /// Verify credentials and open a session lasting `ttl`
    ///
    /// Unknown user and wrong password both yield
    /// [`AuthError::InvalidCredentials`] after the same amount of work.
    pub async fn begin_session(
        &self,
        user_name: &str,
        password: String,
        ttl: Duration,
    ) -> AuthResult<SessionKey> {
        let user_name = UserName::parse(user_name).map_err(ValidationError::from)?;
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| AuthError::Internal(format!("Session TTL out of range: {e}")))?;

        let candidate = self.users.find_by_user_name(&user_name).await?;
        let password = ClearTextPassword::normalized(password);
        let verifier = Arc::clone(&self.verifier);

        let user = tokio::task::spawn_blocking(move || authenticate(&verifier, candidate, &password))
            .await?
            .ok_or_else(|| {
                tracing::debug!(user_name = %user_name, "Credential check failed");
                AuthError::InvalidCredentials
            })?;

        let session = Session::new(user.user_id, user.user_name, Utc::now(), ttl);
        let key = self.insert(session)?;

        tracing::info!(
            user_id = %user.user_id,
            session = %key.fingerprint(),
            ttl_ms = ttl.num_milliseconds(),
            "Session started"
        );

        Ok(key)
    }

    /// Resolve a session key to its owner
    pub fn validate_session(&self, key: &SessionKey) -> AuthResult<UserId> {
        self.validate_session_at(key, Utc::now())
    }

    /// Resolve a session key to its owner as of `now`
    pub fn validate_session_at(&self, key: &SessionKey, now: DateTime<Utc>) -> AuthResult<UserId> {
        self.lookup_at(key, now).map(|session| session.user_id)
    }

    /// Resolve a session key to its owner, requiring the owner be `user_name`
    pub fn validate_for(&self, user_name: &str, key: &SessionKey) -> AuthResult<UserId> {
        self.authorize(user_name, key).map(|session| session.user_id)
    }

    /// Resolve a session key and check it belongs to `user_name`
    ///
    /// A live key presented under someone else's name is reported as
    /// [`AuthError::InvalidSession`].
    pub fn authorize(&self, user_name: &str, key: &SessionKey) -> AuthResult<Session> {
        self.authorize_at(user_name, key, Utc::now())
    }

    pub fn authorize_at(
        &self,
        user_name: &str,
        key: &SessionKey,
        now: DateTime<Utc>,
    ) -> AuthResult<Session> {
        let user_name = UserName::parse(user_name).map_err(ValidationError::from)?;
        let session = self.lookup_at(key, now)?;

        if session.user_name != user_name {
            tracing::warn!(
                session = %key.fingerprint(),
                claimed = %user_name,
                "Session presented under a different user name"
            );
            return Err(AuthError::InvalidSession);
        }

        Ok(session)
    }

    /// Drop a session. Unknown keys are ignored.
    pub fn end_session(&self, key: &SessionKey) {
        match self.lock().remove(key) {
            Some(session) => {
                tracing::info!(
                    user_id = %session.user_id,
                    session = %key.fingerprint(),
                    "Session ended"
                );
            }
            None => {
                tracing::debug!(session = %key.fingerprint(), "End of unknown session ignored");
            }
        }
    }

    /// Evict every session expired as of `now`, returning how many were removed
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired_at(now));
        before - sessions.len()
    }

    /// Number of sessions currently held (expired ones included until evicted)
    pub fn active_sessions(&self) -> usize {
        self.lock().len()
    }

    /// Run [`Self::sweep_expired`] every `period` on the current runtime
    pub fn spawn_sweeper(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let evicted = self.sweep_expired(Utc::now());
                if evicted > 0 {
                    tracing::debug!(evicted, remaining = self.active_sessions(), "Expired sessions swept");
                }
            }
        })
    }

    fn lookup_at(&self, key: &SessionKey, now: DateTime<Utc>) -> AuthResult<Session> {
        let mut sessions = self.lock();

        let expired = match sessions.get(key) {
            None => return Err(AuthError::InvalidSession),
            Some(session) => session.is_expired_at(now),
        };

        if expired {
            sessions.remove(key);
            tracing::debug!(session = %key.fingerprint(), "Expired session evicted");
            return Err(AuthError::Expired);
        }

        sessions.get(key).cloned().ok_or(AuthError::InvalidSession)
    }

    /// Store under a fresh key, redrawing on the (astronomically unlikely) collision
    fn insert(&self, session: Session) -> AuthResult<SessionKey> {
        loop {
            let key = SessionKey::generate()?;
            match self.lock().entry(key.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(session);
                    return Ok(key);
                }
                Entry::Occupied(_) => {
                    tracing::warn!("Session key collision, drawing again");
                }
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionKey, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Check `password` against `candidate`, burning equivalent CPU when there is no candidate
fn authenticate(
    verifier: &CredentialVerifier,
    candidate: Option<User>,
    password: &ClearTextPassword,
) -> Option<User> {
    match candidate {
        Some(user) => verifier
            .verify(password, &user.credential.key, &user.credential.salt)
            .then_some(user),
        None => {
            verifier.equalize_timing(password);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use platform::password::KdfParams;

    use super::*;
    use crate::domain::entity::user::NewUser;
    use crate::infra::memory::InMemoryUserRepository;

    const TTL: Duration = Duration::from_secs(10);

    async fn store_with_alice() -> SessionStore<InMemoryUserRepository> {
        let verifier = Arc::new(CredentialVerifier::new(KdfParams::minimal(), None).unwrap());
        let repo = Arc::new(InMemoryUserRepository::new());

        let password = ClearTextPassword::new("correct horse battery".to_string()).unwrap();
        let credential = verifier.create_credential(&password).unwrap();
        repo.insert(NewUser::new(UserName::parse("alice").unwrap(), credential))
            .await
            .unwrap();

        SessionStore::new(repo, verifier)
    }

    #[tokio::test]
    async fn test_begin_and_validate() {
        let store = store_with_alice().await;
        let key = store
            .begin_session("alice", "correct horse battery".into(), TTL)
            .await
            .unwrap();

        let user_id = store.validate_session(&key).unwrap();
        assert_eq!(user_id, UserId::from_i64(1));
        assert_eq!(store.active_sessions(), 1);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_alike() {
        let store = store_with_alice().await;

        let wrong = store
            .begin_session("alice", "wrong horse battery".into(), TTL)
            .await
            .unwrap_err();
        let unknown = store
            .begin_session("mallory", "correct horse battery".into(), TTL)
            .await
            .unwrap_err();

        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert_eq!(store.active_sessions(), 0);
    }

    #[tokio::test]
    async fn test_malformed_user_name_is_validation_error() {
        let store = store_with_alice().await;
        let err = store
            .begin_session("a", "correct horse battery".into(), TTL)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_expiry_evicts() {
        let store = store_with_alice().await;
        let key = store
            .begin_session("alice", "correct horse battery".into(), TTL)
            .await
            .unwrap();

        let later = Utc::now() + chrono::Duration::seconds(11);
        assert!(matches!(
            store.validate_session_at(&key, later),
            Err(AuthError::Expired)
        ));
        // Evicted on the failed lookup
        assert_eq!(store.active_sessions(), 0);
        assert!(matches!(
            store.validate_session(&key),
            Err(AuthError::InvalidSession)
        ));
    }

    #[tokio::test]
    async fn test_unknown_key() {
        let store = store_with_alice().await;
        let key = SessionKey::from_client("never-issued");
        assert!(matches!(
            store.validate_session(&key),
            Err(AuthError::InvalidSession)
        ));
    }

    #[tokio::test]
    async fn test_end_session_is_idempotent() {
        let store = store_with_alice().await;
        let key = store
            .begin_session("alice", "correct horse battery".into(), TTL)
            .await
            .unwrap();

        store.end_session(&key);
        store.end_session(&key);
        store.end_session(&SessionKey::from_client("never-issued"));

        assert!(matches!(
            store.validate_session(&key),
            Err(AuthError::InvalidSession)
        ));
    }

    #[tokio::test]
    async fn test_authorize_checks_owner() {
        let store = store_with_alice().await;
        let key = store
            .begin_session("alice", "correct horse battery".into(), TTL)
            .await
            .unwrap();

        assert!(store.authorize("alice", &key).is_ok());
        assert_eq!(store.validate_for("alice", &key).unwrap(), UserId::from_i64(1));
        assert!(matches!(
            store.authorize("bob", &key),
            Err(AuthError::InvalidSession)
        ));
    }

    #[tokio::test]
    async fn test_sweep_expired() {
        let store = store_with_alice().await;
        store
            .begin_session("alice", "correct horse battery".into(), TTL)
            .await
            .unwrap();
        store
            .begin_session("alice", "correct horse battery".into(), Duration::from_secs(3600))
            .await
            .unwrap();

        let later = Utc::now() + chrono::Duration::seconds(60);
        assert_eq!(store.sweep_expired(later), 1);
        assert_eq!(store.active_sessions(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sign_ins_get_distinct_keys() {
        let store = Arc::new(store_with_alice().await);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .begin_session("alice", "correct horse battery".into(), TTL)
                        .await
                })
            })
            .collect();

        let mut keys = HashSet::new();
        for handle in handles {
            keys.insert(handle.await.unwrap().unwrap());
        }

        assert_eq!(keys.len(), 16);
        assert_eq!(store.active_sessions(), 16);
        for key in &keys {
            assert!(store.validate_session(key).is_ok());
        }
    }
}
