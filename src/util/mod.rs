//! Utility modules for repohub.

pub mod clock;
pub mod id_source;

pub use clock::{Clock, ManualClock, SystemClock};
pub use id_source::{IdSource, SequentialIdSource, UuidIdSource};
