//! Topic-based event bus for runtime events.
//!
//! Every observable change is published to one of three topics so consumers
//! subscribe only to what they need.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{CombatEvent, LifecycleEvent, ResourceEvent};
