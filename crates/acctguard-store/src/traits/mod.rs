//! Interfaces for the persistence and audit collaborators.
//!
//! Production deployments implement these over their own storage engine;
//! the core only ever talks to them through `Arc<dyn Trait>`.

pub mod audit;
pub mod session;
pub mod user;

pub use audit::AuditSink;
pub use session::SessionStore;
pub use user::UserStore;
