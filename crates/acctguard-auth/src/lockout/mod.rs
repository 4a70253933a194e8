//! Failed-login lockout and administrator account locks.

pub mod machine;

pub use machine::{FailureOutcome, LockoutStateMachine, LockoutStatus};
