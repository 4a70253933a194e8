//! Session issuance, validation, and eviction.

pub mod registry;
pub mod token;

pub use registry::{CreatedSession, SessionRegistry, ValidatedSession};
pub use token::TokenGenerator;
