//! Best-effort audit delivery.

use std::sync::Arc;

use tracing::warn;

use acctguard_entity::audit::AuditEvent;
use acctguard_store::traits::AuditSink;

/// Wraps an [`AuditSink`] so that delivery failures are logged, not returned.
#[derive(Clone)]
pub struct AuditRecorder {
    sink: Arc<dyn AuditSink>,
}

impl std::fmt::Debug for AuditRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditRecorder").finish()
    }
}

impl AuditRecorder {
    /// Creates a recorder over `sink`.
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Delivers `event`, swallowing any sink error.
    pub async fn record(&self, event: AuditEvent) {
        if let Err(e) = self.sink.log_event(&event).await {
            warn!(
                event_type = %event.event_type,
                error = %e,
                "Failed to record audit event"
            );
        }
    }
}
