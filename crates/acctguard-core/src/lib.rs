//! # acctguard-core
//!
//! Core crate for AcctGuard. Contains configuration schemas, the injectable
//! clock abstraction, and the unified error system.
//!
//! This crate has **no** internal dependencies on other AcctGuard crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
