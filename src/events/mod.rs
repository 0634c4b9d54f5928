//! Cognition event system for live readers
//!
//! This module provides:
//! - `CognitionEvent` — typed events emitted by the cognition loop
//! - `EventBus` — broadcast channel distributing events to subscribers

mod bus;
mod types;

pub use bus::EventBus;
pub use types::{CognitionEvent, EventEmitter};
