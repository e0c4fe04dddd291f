//! Security primitives: operator password verification and flood control.

pub mod password;
pub mod rate_limit;

pub use password::{hash_password, verify_password};
pub use rate_limit::RateLimiter;
