//! Core traits defined in `acctguard-core` and implemented or consumed by other crates.

pub mod clock;

pub use clock::{Clock, ManualClock, SystemClock};
