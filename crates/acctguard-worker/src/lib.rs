//! Background sweeps for AcctGuard.
//!
//! This crate provides:
//! - A job executor that dispatches runs to the registered handler
//! - A cron scheduler that triggers the sweeps on their configured schedules
//! - The lapsed-lockout release and expired-session cleanup jobs

pub mod executor;
pub mod jobs;
pub mod scheduler;

pub use executor::{JobExecutionError, JobExecutor, JobHandler, JobRun};
pub use scheduler::CronScheduler;
