pub mod clock;
pub mod controller;
pub mod types;
pub mod validate;

pub use clock::{Clock, FixedClock, SystemClock};
pub use controller::{AccessController, AccessPolicy};
pub use types::*;
