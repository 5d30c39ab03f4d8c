//! Playback notifications and scheduling primitives

mod bus;
mod debounce;

pub use bus::{Channel, EventBus, PassId, PlaybackEvent, SubscriptionHandle};
pub use debounce::{Clock, Debouncer, ManualClock, SystemClock};
