//! Infrastructure Layer
//!
//! User repository implementations.

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryUserRepository;
pub use sqlite::SqliteUserRepository;
