//! Release of lapsed standard lockouts.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use acctguard_auth::lockout::LockoutStateMachine;

use crate::executor::{JobExecutionError, JobHandler, JobRun};

/// Clears every standard lock whose window ended before the run instant.
#[derive(Debug)]
pub struct AutoUnlockJob {
    lockout: Arc<LockoutStateMachine>,
}

impl AutoUnlockJob {
    /// Job type used for registration and scheduling.
    pub const JOB_TYPE: &'static str = "auto_unlock";

    /// Create a new auto-unlock job
    pub fn new(lockout: Arc<LockoutStateMachine>) -> Self {
        Self { lockout }
    }
}

#[async_trait]
impl JobHandler for AutoUnlockJob {
    fn job_type(&self) -> &str {
        Self::JOB_TYPE
    }

    async fn execute(&self, run: &JobRun) -> Result<Option<Value>, JobExecutionError> {
        let released = self
            .lockout
            .auto_unlock_expired(run.triggered_at)
            .await
            .map_err(|e| JobExecutionError::from_app("Auto-unlock sweep failed", e))?;

        Ok(Some(serde_json::json!({
            "task": Self::JOB_TYPE,
            "accounts_unlocked": released,
        })))
    }
}
