//! Session Entity
//!
//! Time-bounded proof that a user authenticated. Lives only in process
//! memory; nothing is persisted across restarts.

use chrono::{DateTime, Duration, Utc};

use crate::domain::value_object::{user_id::UserId, user_name::UserName};

/// In-memory session record
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: UserId,
    /// Owner's name, checked against the name a request claims
    pub user_name: UserName,
    pub created_at: DateTime<Utc>,
    pub time_to_live: Duration,
}

impl Session {
    /// Start a session at `now`
    ///
    /// TTL is provided by the application layer (config), not hard-coded here.
    pub fn new(user_id: UserId, user_name: UserName, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            user_id,
            user_name,
            created_at: now,
            time_to_live: ttl,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + self.time_to_live
    }

    /// Expired strictly after `created_at + ttl`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at()
    }

    /// Remaining lifetime in milliseconds, floored at zero
    pub fn remaining_ms(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at() - now).num_milliseconds().max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(now: DateTime<Utc>) -> Session {
        Session::new(
            UserId::from_i64(1),
            UserName::parse("alice").unwrap(),
            now,
            Duration::seconds(10),
        )
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let s = session(now);

        assert!(!s.is_expired_at(now));
        assert!(!s.is_expired_at(now + Duration::seconds(10)));
        assert!(s.is_expired_at(now + Duration::seconds(10) + Duration::milliseconds(1)));
    }

    #[test]
    fn test_remaining_ms() {
        let now = Utc::now();
        let s = session(now);
        assert_eq!(s.remaining_ms(now), 10_000);
        assert_eq!(s.remaining_ms(now + Duration::seconds(30)), 0);
    }
}
