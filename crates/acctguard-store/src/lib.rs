//! # acctguard-store
//!
//! Collaborator interfaces consumed by the account-security core, and
//! single-node implementations of them.
//!
//! ## Modules
//!
//! - `traits`: `UserStore`, `SessionStore`, and `AuditSink`
//! - `memory`: in-memory stores guarded by `tokio::sync::RwLock`
//! - `log_sink`: an audit sink that writes events to `tracing`

pub mod log_sink;
pub mod memory;
pub mod traits;

pub use log_sink::TracingAuditSink;
pub use memory::{MemoryAuditSink, MemorySessionStore, MemoryUserStore};
pub use traits::{AuditSink, SessionStore, UserStore};
