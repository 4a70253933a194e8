//! Session record, filters, and device classification.

pub mod device;
pub mod model;

pub use device::DeviceClass;
pub use model::{Session, SessionFilter, SessionOrder};
