//! Audit sink interface.

use async_trait::async_trait;

use acctguard_core::result::AppResult;
use acctguard_entity::audit::AuditEvent;

/// Destination for security audit events.
///
/// Callers treat delivery as best-effort: an error here is logged and never
/// fails the lockout or session operation that produced the event.
#[async_trait]
pub trait AuditSink: Send + Sync + 'static {
    /// Record one event.
    async fn log_event(&self, event: &AuditEvent) -> AppResult<()>;
}
