//! Role-based password expiration.

pub mod expiration;

pub use expiration::{ExpirationStatus, PasswordExpirationPolicy, should_warn, warning_level};
