//! Audit sink that forwards events to `tracing`.

use async_trait::async_trait;
use tracing::{error, info, warn};

use acctguard_core::result::AppResult;
use acctguard_entity::audit::{AuditEvent, AuditSeverity};

use crate::traits::AuditSink;

/// Writes each audit event as one structured log line on the `audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    /// Creates the sink.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn log_event(&self, event: &AuditEvent) -> AppResult<()> {
        let extra = serde_json::Value::Object(event.extra.clone());
        let actor = event.actor_user_id.map(|id| id.to_string());
        let ip = event.ip_address.map(|ip| ip.to_string());

        match event.severity {
            AuditSeverity::Info => info!(
                target: "audit",
                event_type = %event.event_type,
                actor_user_id = actor.as_deref(),
                actor_username = event.actor_username.as_deref(),
                ip = ip.as_deref(),
                blocked = event.blocked,
                extra = %extra,
                "Security event"
            ),
            AuditSeverity::Warning => warn!(
                target: "audit",
                event_type = %event.event_type,
                actor_user_id = actor.as_deref(),
                actor_username = event.actor_username.as_deref(),
                ip = ip.as_deref(),
                blocked = event.blocked,
                extra = %extra,
                "Security event"
            ),
            AuditSeverity::Critical => error!(
                target: "audit",
                event_type = %event.event_type,
                actor_user_id = actor.as_deref(),
                actor_username = event.actor_username.as_deref(),
                ip = ip.as_deref(),
                blocked = event.blocked,
                extra = %extra,
                "Security event"
            ),
        }
        Ok(())
    }
}
