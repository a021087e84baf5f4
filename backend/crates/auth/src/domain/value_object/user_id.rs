use kernel::id::{Id, markers};

pub type UserId = Id<markers::User>;

/// Identity reserved for the built-in administrator account
pub const ADMIN_USER_ID: UserId = UserId::from_i64(0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_id_is_zero() {
        assert_eq!(ADMIN_USER_ID.as_i64(), 0);
        assert_eq!(ADMIN_USER_ID, UserId::from_i64(0));
    }
}
