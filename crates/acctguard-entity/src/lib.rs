//! # acctguard-entity
//!
//! Domain entity models for AcctGuard. Every struct in this crate is either
//! a stored record (user auth record, session), a partial update or filter
//! over one, or a domain value object. All entities derive `Debug`, `Clone`,
//! `Serialize`, and `Deserialize`.

pub mod audit;
pub mod session;
pub mod user;
