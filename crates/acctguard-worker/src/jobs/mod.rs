//! Built-in job handler implementations.

pub mod session_cleanup;
pub mod unlock;

pub use session_cleanup::SessionCleanupJob;
pub use unlock::AutoUnlockJob;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use chrono::{DateTime, TimeZone, Utc};

    use acctguard_auth::audit::AuditRecorder;
    use acctguard_auth::lockout::LockoutStateMachine;
    use acctguard_auth::session::SessionRegistry;
    use acctguard_core::config::AppConfig;
    use acctguard_core::traits::ManualClock;
    use acctguard_store::memory::{MemoryAuditSink, MemorySessionStore, MemoryUserStore};

    pub fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    pub struct Stores {
        pub clock: Arc<ManualClock>,
        pub users: MemoryUserStore,
        pub sessions: MemorySessionStore,
        pub audit: MemoryAuditSink,
    }

    impl Stores {
        pub fn new() -> Self {
            Self {
                clock: Arc::new(ManualClock::new(t0())),
                users: MemoryUserStore::new(),
                sessions: MemorySessionStore::new(),
                audit: MemoryAuditSink::new(),
            }
        }

        pub fn lockout(&self) -> Arc<LockoutStateMachine> {
            Arc::new(LockoutStateMachine::new(
                Arc::new(self.users.clone()),
                AuditRecorder::new(Arc::new(self.audit.clone())),
                self.clock.clone(),
                AppConfig::default().lockout,
            ))
        }

        pub fn registry(&self) -> Arc<SessionRegistry> {
            Arc::new(SessionRegistry::new(
                Arc::new(self.sessions.clone()),
                Arc::new(self.users.clone()),
                self.clock.clone(),
                AppConfig::default().session,
            ))
        }
    }
}
