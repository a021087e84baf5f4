//! Shipped language builders

pub mod odin;
pub mod zig;

pub use odin::OdinBuilder;
pub use zig::ZigBuilder;
