//! Shared test helpers for integration tests.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use uuid::Uuid;

use acctguard_auth::{
    AuditRecorder, CredentialGate, LockoutStateMachine, LoginOutcome, PasswordExpirationPolicy,
    SessionRegistry,
};
use acctguard_core::config::AppConfig;
use acctguard_core::traits::{Clock, ManualClock};
use acctguard_entity::audit::RequestContext;
use acctguard_entity::session::Session;
use acctguard_entity::user::UserAuthRecord;
use acctguard_store::{MemoryAuditSink, MemorySessionStore, MemoryUserStore};
use acctguard_worker::{CronScheduler, JobExecutor, JobRun};

/// Test application context
pub struct TestApp {
    /// Controllable time source shared by every service
    pub clock: Arc<ManualClock>,
    /// User records
    pub users: MemoryUserStore,
    /// Session records
    pub sessions: MemorySessionStore,
    /// Captured audit events
    pub audit: MemoryAuditSink,
    /// The login orchestrator
    pub gate: CredentialGate,
    /// Direct access to the session registry
    pub registry: Arc<SessionRegistry>,
    /// The sweep handlers the scheduler would trigger
    pub executor: JobExecutor,
}

impl TestApp {
    /// Create a new test application with default configuration
    pub fn new() -> Self {
        let config = AppConfig::default();
        let clock = Arc::new(ManualClock::new(start_time()));
        let users = MemoryUserStore::new();
        let sessions = MemorySessionStore::new();
        let audit = MemoryAuditSink::new();

        let dyn_clock: Arc<dyn Clock> = clock.clone();
        let recorder = AuditRecorder::new(Arc::new(audit.clone()));
        let lockout = Arc::new(LockoutStateMachine::new(
            Arc::new(users.clone()),
            recorder.clone(),
            Arc::clone(&dyn_clock),
            config.lockout.clone(),
        ));
        let policy = Arc::new(PasswordExpirationPolicy::new(
            Arc::new(users.clone()),
            Arc::clone(&dyn_clock),
            config.password.clone(),
        ));
        let registry = Arc::new(SessionRegistry::new(
            Arc::new(sessions.clone()),
            Arc::new(users.clone()),
            Arc::clone(&dyn_clock),
            config.session.clone(),
        ));
        let gate = CredentialGate::new(
            Arc::new(users.clone()),
            Arc::clone(&lockout),
            policy,
            Arc::clone(&registry),
            recorder,
            dyn_clock,
        );
        let executor = CronScheduler::default_executor(lockout, Arc::clone(&registry));

        Self {
            clock,
            users,
            sessions,
            audit,
            gate,
            registry,
            executor,
        }
    }

    /// Create a user with the given role
    pub async fn create_test_user(&self, username: &str, role: &str) -> UserAuthRecord {
        self.users.insert(UserAuthRecord::new(username, role)).await
    }

    /// Current stored record of a user
    pub async fn user(&self, id: Uuid) -> UserAuthRecord {
        self.users.get(id).await.expect("user exists")
    }

    /// Log in with matching credentials and return the issued session
    pub async fn login(&self, user_id: Uuid) -> Session {
        match self
            .gate
            .record_success_and_issue_session(user_id, &request())
            .await
            .expect("login succeeds")
        {
            LoginOutcome::Granted { session, .. } => session,
            other => panic!("expected a session, got {other:?}"),
        }
    }

    /// Run one scheduled sweep at the current clock instant
    pub async fn run_job(&self, job_type: &str) -> Value {
        self.executor
            .execute(&JobRun::new(job_type, self.clock.now()))
            .await
            .expect("job succeeds")
            .expect("job returns a summary")
    }
}

/// Fixed instant every test starts at
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 8, 30, 0).unwrap()
}

/// A login request from a desktop browser
pub fn request() -> RequestContext {
    RequestContext::new(
        "203.0.113.9".parse().ok(),
        Some("Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0) AppleWebKit/605.1.15"),
    )
    .with_route("POST", "/api/auth/login")
}
