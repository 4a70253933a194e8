//! Expired session cleanup.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use acctguard_auth::session::SessionRegistry;

use crate::executor::{JobExecutionError, JobHandler, JobRun};

/// Deletes every session whose absolute expiry passed before the run instant.
#[derive(Debug)]
pub struct SessionCleanupJob {
    sessions: Arc<SessionRegistry>,
}

impl SessionCleanupJob {
    /// Job type used for registration and scheduling.
    pub const JOB_TYPE: &'static str = "session_cleanup";

    /// Create a new session cleanup job
    pub fn new(sessions: Arc<SessionRegistry>) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl JobHandler for SessionCleanupJob {
    fn job_type(&self) -> &str {
        Self::JOB_TYPE
    }

    async fn execute(&self, run: &JobRun) -> Result<Option<Value>, JobExecutionError> {
        // Store failures are logged by the registry and reported as zero.
        let removed = self.sessions.cleanup_expired(run.triggered_at).await;

        Ok(Some(serde_json::json!({
            "task": Self::JOB_TYPE,
            "expired_sessions_removed": removed,
        })))
    }
}
