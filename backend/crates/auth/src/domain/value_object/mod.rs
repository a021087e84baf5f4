//! Value Objects
//!
//! Immutable, self-validating domain primitives.

pub mod session_key;
pub mod user_id;
pub mod user_name;

pub use session_key::SessionKey;
pub use user_id::{ADMIN_USER_ID, UserId};
pub use user_name::{UserName, UserNameError, ValidationError};
