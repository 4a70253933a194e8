//! Security audit events.

pub mod model;

pub use model::{AuditCategory, AuditEvent, AuditEventType, AuditSeverity, RequestContext};
