//! Background sweep configuration.

use serde::{Deserialize, Serialize};

/// Schedules for the periodic lockout and session sweeps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the scheduler is started at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cron expression (with seconds) for releasing lapsed standard locks.
    #[serde(default = "default_unlock_schedule")]
    pub auto_unlock_schedule: String,
    /// Cron expression (with seconds) for deleting expired sessions.
    #[serde(default = "default_cleanup_schedule")]
    pub session_cleanup_schedule: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_unlock_schedule: default_unlock_schedule(),
            session_cleanup_schedule: default_cleanup_schedule(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_unlock_schedule() -> String {
    "0 * * * * *".to_string()
}

fn default_cleanup_schedule() -> String {
    "0 */15 * * * *".to_string()
}
