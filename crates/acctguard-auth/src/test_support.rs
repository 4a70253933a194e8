//! Shared fixtures for unit tests.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use acctguard_core::config::AppConfig;
use acctguard_core::traits::{Clock, ManualClock};
use acctguard_entity::user::UserAuthRecord;
use acctguard_store::memory::{MemoryAuditSink, MemorySessionStore, MemoryUserStore};

use crate::audit::AuditRecorder;
use crate::gate::CredentialGate;
use crate::lockout::LockoutStateMachine;
use crate::password::PasswordExpirationPolicy;
use crate::session::SessionRegistry;

/// Fixed starting instant for every test.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
}

/// In-memory stores, a manual clock, and default configuration.
pub struct Fixture {
    pub clock: Arc<ManualClock>,
    pub users: MemoryUserStore,
    pub sessions: MemorySessionStore,
    pub audit: MemoryAuditSink,
    pub config: AppConfig,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            clock: Arc::new(ManualClock::new(t0())),
            users: MemoryUserStore::new(),
            sessions: MemorySessionStore::new(),
            audit: MemoryAuditSink::new(),
            config: AppConfig::default(),
        }
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    pub fn recorder(&self) -> AuditRecorder {
        AuditRecorder::new(Arc::new(self.audit.clone()))
    }

    pub fn lockout(&self) -> LockoutStateMachine {
        LockoutStateMachine::new(
            Arc::new(self.users.clone()),
            self.recorder(),
            self.clock(),
            self.config.lockout.clone(),
        )
    }

    pub fn policy(&self) -> PasswordExpirationPolicy {
        PasswordExpirationPolicy::new(
            Arc::new(self.users.clone()),
            self.clock(),
            self.config.password.clone(),
        )
    }

    pub fn registry(&self) -> SessionRegistry {
        SessionRegistry::new(
            Arc::new(self.sessions.clone()),
            Arc::new(self.users.clone()),
            self.clock(),
            self.config.session.clone(),
        )
    }

    pub fn gate(&self) -> CredentialGate {
        CredentialGate::new(
            Arc::new(self.users.clone()),
            Arc::new(self.lockout()),
            Arc::new(self.policy()),
            Arc::new(self.registry()),
            self.recorder(),
            self.clock(),
        )
    }

    pub async fn seed_user(&self, role: &str) -> UserAuthRecord {
        self.users.insert(UserAuthRecord::new("jdoe", role)).await
    }
}
