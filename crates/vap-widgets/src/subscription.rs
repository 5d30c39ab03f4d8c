//! Subscription helpers for feeding engine notifications into iced
//!
//! The playback engine usually lives on another thread and posts
//! [`PlaybackEvent`]s to a `std::sync::mpsc` channel. These helpers turn that
//! channel into a `Subscription` that yields batches: everything queued when
//! the receiver is polled arrives together, so the application can hand a
//! batch to `EventBus::emit_all` as one coordinator pass.
//!
//! # Usage
//!
//! ```ignore
//! use vap_widgets::{engine_events, scheduler_ticks};
//!
//! fn subscription(&self) -> Subscription<Message> {
//!     Subscription::batch([
//!         engine_events(self.engine_receiver.clone()).map(Message::Engine),
//!         scheduler_ticks(Duration::from_millis(16)).map(|_| Message::Tick),
//!     ])
//! }
//! ```

use std::any::TypeId;
use std::hash::Hash;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use iced::advanced::subscription::{self, EventStream, Hasher, Recipe};
use iced::futures::stream::BoxStream;
use iced::Subscription;
use vap_core::events::PlaybackEvent;

/// Poll interval while the channel is empty
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Recipe draining an mpsc receiver in batches
struct BatchRecipe<T> {
    /// Subscription identity (receiver address)
    id: u64,
    receiver: Arc<Mutex<Receiver<T>>>,
}

impl<T: Send + 'static> Recipe for BatchRecipe<T> {
    type Output = Vec<T>;

    fn hash(&self, state: &mut Hasher) {
        TypeId::of::<Self>().hash(state);
        self.id.hash(state);
    }

    fn stream(self: Box<Self>, _input: EventStream) -> BoxStream<'static, Self::Output> {
        let receiver = self.receiver;

        Box::pin(iced::futures::stream::unfold(receiver, |rx| async move {
            loop {
                let batch = rx.lock().map(|r| drain(&r)).unwrap_or_default();
                if !batch.is_empty() {
                    return Some((batch, rx));
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        }))
    }
}

/// Everything currently queued, without blocking
pub fn drain<T>(receiver: &Receiver<T>) -> Vec<T> {
    receiver.try_iter().collect()
}

/// Engine notifications as an iced subscription, one batch per pass
pub fn engine_events(receiver: Arc<Mutex<Receiver<PlaybackEvent>>>) -> Subscription<Vec<PlaybackEvent>> {
    let id = Arc::as_ptr(&receiver) as u64;
    subscription::from_recipe(BatchRecipe { id, receiver })
}

/// Variant of [`engine_events`] that takes ownership of the receiver
pub fn engine_events_owned(receiver: Receiver<PlaybackEvent>) -> Subscription<Vec<PlaybackEvent>> {
    engine_events(Arc::new(Mutex::new(receiver)))
}

/// Periodic tick for `RenderCoordinator::tick` (debounced resizes)
pub fn scheduler_ticks(interval: Duration) -> Subscription<iced::time::Instant> {
    iced::time::every(interval)
}
