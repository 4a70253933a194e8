//! Failed-login lockout configuration.

use serde::{Deserialize, Serialize};

/// Thresholds for the failed-login lockout state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockoutConfig {
    /// Failed attempts that trigger a lock.
    #[serde(default = "default_max_failed")]
    pub max_failed_attempts: u32,
    /// Attempts above this count produce a security lock instead of a standard one.
    #[serde(default = "default_security_threshold")]
    pub security_threshold: u32,
    /// Duration of a standard lock in minutes.
    #[serde(default = "default_lockout_duration")]
    pub lockout_duration_minutes: i64,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: default_max_failed(),
            security_threshold: default_security_threshold(),
            lockout_duration_minutes: default_lockout_duration(),
        }
    }
}

fn default_max_failed() -> u32 {
    5
}

fn default_security_threshold() -> u32 {
    10
}

fn default_lockout_duration() -> i64 {
    30
}
