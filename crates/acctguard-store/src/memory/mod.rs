//! In-memory collaborators for single-node deployments and tests.
//!
//! Each store can be switched into an "unavailable" mode in which every call
//! fails with `ErrorKind::Store`, to exercise outage handling.

pub mod audit;
pub mod session;
pub mod user;

pub use audit::MemoryAuditSink;
pub use session::MemorySessionStore;
pub use user::MemoryUserStore;
