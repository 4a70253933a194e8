//! Cron scheduler for the periodic lockout and session sweeps.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use acctguard_auth::lockout::LockoutStateMachine;
use acctguard_auth::session::SessionRegistry;
use acctguard_core::config::WorkerConfig;
use acctguard_core::error::AppError;
use acctguard_core::traits::Clock;

use crate::executor::{JobExecutor, JobRun};
use crate::jobs::{AutoUnlockJob, SessionCleanupJob};

/// Cron-based scheduler for the background sweeps
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Handlers the cron triggers dispatch to
    executor: Arc<JobExecutor>,
    /// Source of each run's evaluation instant
    clock: Arc<dyn Clock>,
    /// Schedules
    config: WorkerConfig,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler")
            .field("config", &self.config)
            .finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new(
        executor: Arc<JobExecutor>,
        clock: Arc<dyn Clock>,
        config: WorkerConfig,
    ) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self {
            scheduler,
            executor,
            clock,
            config,
        })
    }

    /// Builds the executor with both sweeps registered.
    pub fn default_executor(
        lockout: Arc<LockoutStateMachine>,
        sessions: Arc<SessionRegistry>,
    ) -> JobExecutor {
        let mut executor = JobExecutor::new();
        executor.register(Arc::new(AutoUnlockJob::new(lockout)));
        executor.register(Arc::new(SessionCleanupJob::new(sessions)));
        executor
    }

    /// Register both sweeps on their configured schedules
    pub async fn register_default_tasks(&self) -> Result<(), AppError> {
        self.register(AutoUnlockJob::JOB_TYPE, &self.config.auto_unlock_schedule)
            .await?;
        self.register(
            SessionCleanupJob::JOB_TYPE,
            &self.config.session_cleanup_schedule,
        )
        .await?;

        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }

    /// Adds one cron trigger that runs `job_type` through the executor.
    async fn register(&self, job_type: &'static str, schedule: &str) -> Result<(), AppError> {
        if !self.executor.has_handler(job_type) {
            return Err(AppError::configuration(format!(
                "No handler registered for scheduled job '{job_type}'"
            )));
        }

        let executor = Arc::clone(&self.executor);
        let clock = Arc::clone(&self.clock);
        let job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let executor = Arc::clone(&executor);
            let clock = Arc::clone(&clock);
            Box::pin(async move {
                let run = JobRun::new(job_type, clock.now());
                match executor.execute(&run).await {
                    Ok(summary) => {
                        tracing::debug!(run_id = %run.id, job_type, summary = ?summary, "Job finished");
                    }
                    Err(e) => {
                        tracing::error!(run_id = %run.id, job_type, error = %e, "Job failed");
                    }
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!(
                "Invalid schedule '{schedule}' for {job_type}: {e}"
            ))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add {job_type} schedule: {}", e))
        })?;

        tracing::info!(job_type, schedule, "Registered scheduled task");
        Ok(())
    }
}
