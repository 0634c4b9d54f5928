//! Associative short-term memory
//!
//! - [`cache`] — `DecayingCache`, bounded and time-decaying
//! - [`clock`] — injectable time source (`SystemClock`, `ManualClock`)

pub mod cache;
pub mod clock;

pub use cache::{CacheConfig, DecayingCache};
pub use clock::{Clock, ManualClock, SystemClock};
