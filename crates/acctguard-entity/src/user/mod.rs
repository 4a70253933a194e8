//! User auth record, lock state, and store-boundary patch/filter types.

pub mod lockout;
pub mod model;
pub mod patch;

pub use lockout::{LockState, LockoutReason, LockoutType};
pub use model::UserAuthRecord;
pub use patch::{UserFilter, UserPatch};
