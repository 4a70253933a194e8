//! Job executor: dispatches scheduled runs to registered handlers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use acctguard_core::error::AppError;

/// One triggered run of a scheduled job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRun {
    /// Run identifier, for log correlation.
    pub id: Uuid,
    /// Which handler should process the run.
    pub job_type: String,
    /// The instant the sweep evaluates its predicates against.
    pub triggered_at: DateTime<Utc>,
}

impl JobRun {
    /// Creates a run of `job_type` at `triggered_at`.
    pub fn new(job_type: impl Into<String>, triggered_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_type: job_type.into(),
            triggered_at,
        }
    }
}

/// Trait for job handler implementations
#[async_trait]
pub trait JobHandler: Send + Sync + std::fmt::Debug {
    /// Get the job type this handler processes
    fn job_type(&self) -> &str;

    /// Execute one run and return a JSON summary
    async fn execute(&self, run: &JobRun) -> Result<Option<Value>, JobExecutionError>;
}

/// Error from job execution
#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    /// Permanent failure, do not retry
    #[error("Permanent job failure: {0}")]
    Permanent(String),

    /// Transient failure; the next scheduled run may succeed
    #[error("Transient job failure: {0}")]
    Transient(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

impl JobExecutionError {
    /// Maps a core error, treating store failures as transient.
    pub fn from_app(context: &str, err: AppError) -> Self {
        if err.is_store() {
            Self::Transient(format!("{context}: {err}"))
        } else {
            Self::Internal(err)
        }
    }
}

/// Dispatches runs to the appropriate handler based on job_type
#[derive(Debug, Default)]
pub struct JobExecutor {
    /// Registered job handlers by type
    handlers: HashMap<String, Arc<dyn JobHandler>>,
}

impl JobExecutor {
    /// Create a new job executor
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job handler
    pub fn register(&mut self, handler: Arc<dyn JobHandler>) {
        let job_type = handler.job_type().to_string();
        tracing::info!(job_type = %job_type, "Registered job handler");
        self.handlers.insert(job_type, handler);
    }

    /// Execute a run by dispatching to the correct handler
    pub async fn execute(&self, run: &JobRun) -> Result<Option<Value>, JobExecutionError> {
        let handler = self.handlers.get(&run.job_type).ok_or_else(|| {
            JobExecutionError::Permanent(format!(
                "No handler registered for job type '{}'",
                run.job_type
            ))
        })?;

        tracing::debug!(run_id = %run.id, job_type = %run.job_type, "Executing job");

        handler.execute(run).await
    }

    /// Check if a handler is registered for a job type
    pub fn has_handler(&self, job_type: &str) -> bool {
        self.handlers.contains_key(job_type)
    }

    /// Get the list of registered job types
    pub fn registered_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.handlers.keys().cloned().collect();
        types.sort();
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Echo;

    #[async_trait]
    impl JobHandler for Echo {
        fn job_type(&self) -> &str {
            "echo"
        }

        async fn execute(&self, run: &JobRun) -> Result<Option<Value>, JobExecutionError> {
            Ok(Some(serde_json::json!({ "job_type": run.job_type })))
        }
    }

    #[tokio::test]
    async fn test_dispatch_by_type() {
        let mut executor = JobExecutor::new();
        executor.register(Arc::new(Echo));
        assert!(executor.has_handler("echo"));
        assert_eq!(executor.registered_types(), vec!["echo".to_string()]);

        let out = executor
            .execute(&JobRun::new("echo", Utc::now()))
            .await
            .unwrap();
        assert_eq!(out, Some(serde_json::json!({ "job_type": "echo" })));
    }

    #[tokio::test]
    async fn test_unknown_type_is_permanent() {
        let executor = JobExecutor::new();
        let err = executor
            .execute(&JobRun::new("missing", Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, JobExecutionError::Permanent(_)));
    }

    #[test]
    fn test_store_errors_are_transient() {
        let err = JobExecutionError::from_app("sweep", AppError::store("down"));
        assert!(matches!(err, JobExecutionError::Transient(_)));
        let err = JobExecutionError::from_app("sweep", AppError::internal("bug"));
        assert!(matches!(err, JobExecutionError::Internal(_)));
    }
}
