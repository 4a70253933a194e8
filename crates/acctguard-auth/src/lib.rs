//! # acctguard-auth
//!
//! Account-security and session-lifecycle core.
//!
//! ## Modules
//!
//! - `lockout`: failed-login lockout state machine and administrator locks
//! - `password`: password expiration, grace period, and warning levels
//! - `session`: concurrency-capped session registry and token generation
//! - `gate`: the login orchestrator exposed to the HTTP layer
//! - `audit`: best-effort audit delivery

pub mod audit;
pub mod gate;
pub mod lockout;
pub mod password;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use audit::AuditRecorder;
pub use gate::{CredentialGate, FailureResult, LoginOutcome};
pub use lockout::{FailureOutcome, LockoutStateMachine, LockoutStatus};
pub use password::{ExpirationStatus, PasswordExpirationPolicy};
pub use session::{SessionRegistry, TokenGenerator, ValidatedSession};
