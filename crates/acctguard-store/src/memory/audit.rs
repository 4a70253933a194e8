//! In-memory audit sink.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use acctguard_core::error::AppError;
use acctguard_core::result::AppResult;
use acctguard_entity::audit::{AuditEvent, AuditEventType};

use crate::traits::AuditSink;

/// Collects audit events in a vector.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditSink {
    events: Arc<RwLock<Vec<AuditEvent>>>,
    failing: Arc<AtomicBool>,
}

impl MemoryAuditSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All events recorded so far.
    pub async fn events(&self) -> Vec<AuditEvent> {
        self.events.read().await.clone()
    }

    /// Events of one type recorded so far.
    pub async fn events_of(&self, event_type: AuditEventType) -> Vec<AuditEvent> {
        self.events
            .read()
            .await
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect()
    }

    /// Makes `log_event` fail while `true`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn log_event(&self, event: &AuditEvent) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::store("Audit sink is unavailable"));
        }
        self.events.write().await.push(event.clone());
        Ok(())
    }
}
