//! Typed playback event bus
//!
//! Synchronous, single-threaded publish/subscribe. Handlers register for one
//! channel and get a handle that unsubscribes on drop.
//!
//! Dispatch runs to completion: an event emitted while handlers are running
//! is queued and delivered after the current one, inside the same pass. Each
//! top-level `emit`/`emit_all` call is one pass, and handlers receive its
//! number so they can tell which events arrived together.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

/// Coordinator pass number
pub type PassId = u64;

/// Notification channels exposed by the playback engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Ready,
    Seek,
    Scroll,
    Zoom,
    Redraw,
    Resize,
    TimeUpdate,
    LoadingProgress,
    Play,
    Pause,
}

/// Notification from the playback engine or the hosting view
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// Audio decoded; duration is known
    Ready { duration_secs: f64 },
    /// Playback position jumped to a fraction of the recording
    Seek { fraction: f64 },
    /// Main view scrolled by the user
    Scroll { start_px: u32 },
    /// Zoom factor changed
    Zoom { pixels_per_second: f64 },
    /// Everything should be drawn again
    Redraw,
    /// Main view width changed
    Resize { width_px: u32 },
    /// Playback advanced
    TimeUpdate { time_secs: f64 },
    /// Audio download/decode progress, 0 to 100
    LoadingProgress { percent: u8 },
    Play,
    Pause,
}

impl PlaybackEvent {
    pub fn channel(&self) -> Channel {
        match self {
            PlaybackEvent::Ready { .. } => Channel::Ready,
            PlaybackEvent::Seek { .. } => Channel::Seek,
            PlaybackEvent::Scroll { .. } => Channel::Scroll,
            PlaybackEvent::Zoom { .. } => Channel::Zoom,
            PlaybackEvent::Redraw => Channel::Redraw,
            PlaybackEvent::Resize { .. } => Channel::Resize,
            PlaybackEvent::TimeUpdate { .. } => Channel::TimeUpdate,
            PlaybackEvent::LoadingProgress { .. } => Channel::LoadingProgress,
            PlaybackEvent::Play => Channel::Play,
            PlaybackEvent::Pause => Channel::Pause,
        }
    }
}

type Handler = Rc<RefCell<dyn FnMut(&PlaybackEvent, PassId)>>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: Vec<(u64, Channel, Handler)>,
    queue: VecDeque<PlaybackEvent>,
    dispatching: bool,
    pass: PassId,
}

impl Registry {
    fn is_registered(&self, id: u64) -> bool {
        self.handlers.iter().any(|(handler_id, _, _)| *handler_id == id)
    }
}

/// Channel-based event bus
///
/// Cloning gives another handle to the same bus.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Rc<RefCell<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `channel`
    ///
    /// The handler stays registered until the returned handle is dropped or
    /// [`SubscriptionHandle::unsubscribe`] is called.
    pub fn subscribe<F>(&self, channel: Channel, handler: F) -> SubscriptionHandle
    where
        F: FnMut(&PlaybackEvent, PassId) + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.handlers.push((id, channel, Rc::new(RefCell::new(handler))));
        log::trace!("EventBus: subscribed #{} to {:?}", id, channel);
        SubscriptionHandle {
            registry: Rc::downgrade(&self.registry),
            id: Some(id),
        }
    }

    /// Deliver one event as its own pass
    pub fn emit(&self, event: PlaybackEvent) {
        self.emit_all([event]);
    }

    /// Deliver events in order as a single pass
    ///
    /// Called from inside a handler, the events join the running pass.
    pub fn emit_all<I>(&self, events: I)
    where
        I: IntoIterator<Item = PlaybackEvent>,
    {
        {
            let mut registry = self.registry.borrow_mut();
            registry.queue.extend(events);
            if registry.dispatching {
                return;
            }
            registry.dispatching = true;
            registry.pass += 1;
        }
        self.drain();
    }

    fn drain(&self) {
        loop {
            let (event, pass, handlers) = {
                let mut registry = self.registry.borrow_mut();
                let Some(event) = registry.queue.pop_front() else {
                    registry.dispatching = false;
                    return;
                };
                let channel = event.channel();
                let handlers: Vec<(u64, Handler)> = registry
                    .handlers
                    .iter()
                    .filter(|(_, c, _)| *c == channel)
                    .map(|(id, _, handler)| (*id, handler.clone()))
                    .collect();
                (event, registry.pass, handlers)
            };

            log::trace!("EventBus: pass {} {:?} -> {} handler(s)", pass, event, handlers.len());
            for (id, handler) in handlers {
                // An earlier handler may have unsubscribed this one
                if !self.registry.borrow().is_registered(id) {
                    continue;
                }
                match handler.try_borrow_mut() {
                    Ok(mut handler) => (&mut *handler)(&event, pass),
                    Err(_) => log::warn!("EventBus: handler #{} is already running, skipping", id),
                }
            }
        }
    }

    /// Number of the most recent pass
    pub fn pass(&self) -> PassId {
        self.registry.borrow().pass
    }

    /// Registered handlers across all channels
    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().handlers.len()
    }
}

/// Keeps a handler registered; dropping it unsubscribes
#[must_use = "dropping the handle unsubscribes immediately"]
pub struct SubscriptionHandle {
    registry: Weak<RefCell<Registry>>,
    id: Option<u64>,
}

impl SubscriptionHandle {
    pub fn unsubscribe(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        let (Some(id), Some(registry)) = (self.id.take(), self.registry.upgrade()) else {
            return;
        };
        // Dropped from inside a running handler: the bus is only borrowed
        // between handler calls, so this borrow always succeeds
        if let Ok(mut registry) = registry.try_borrow_mut() {
            registry.handlers.retain(|(handler_id, _, _)| *handler_id != id);
            log::trace!("EventBus: unsubscribed #{}", id);
        };
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_delivers_to_matching_channel() {
        let bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _handle = bus.subscribe(Channel::TimeUpdate, move |event, _| {
            sink.borrow_mut().push(event.clone())
        });

        bus.emit(PlaybackEvent::TimeUpdate { time_secs: 1.0 });
        bus.emit(PlaybackEvent::Seek { fraction: 0.5 });

        assert_eq!(*seen.borrow(), vec![PlaybackEvent::TimeUpdate { time_secs: 1.0 }]);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = EventBus::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let handle = bus.subscribe(Channel::Redraw, move |_, _| c.set(c.get() + 1));

        bus.emit(PlaybackEvent::Redraw);
        drop(handle);
        bus.emit(PlaybackEvent::Redraw);

        assert_eq!(count.get(), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_explicit_unsubscribe_while_bus_alive() {
        let bus = EventBus::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let handle = bus.subscribe(Channel::Zoom, move |_, _| c.set(c.get() + 1));
        let _other = bus.subscribe(Channel::Zoom, |_, _| {});

        handle.unsubscribe();
        bus.emit(PlaybackEvent::Zoom { pixels_per_second: 50.0 });

        assert_eq!(count.get(), 0);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn test_emit_all_is_one_pass() {
        let bus = EventBus::new();
        let passes = Rc::new(RefCell::new(Vec::new()));
        let p = passes.clone();
        let _scroll = bus.subscribe(Channel::Scroll, move |_, pass| p.borrow_mut().push(pass));
        let p = passes.clone();
        let _time = bus.subscribe(Channel::TimeUpdate, move |_, pass| p.borrow_mut().push(pass));

        bus.emit_all([
            PlaybackEvent::Scroll { start_px: 10 },
            PlaybackEvent::TimeUpdate { time_secs: 2.0 },
        ]);
        bus.emit(PlaybackEvent::TimeUpdate { time_secs: 3.0 });

        assert_eq!(*passes.borrow(), vec![1, 1, 2]);
        assert_eq!(bus.pass(), 2);
    }

    #[test]
    fn test_emit_during_dispatch_is_queued() {
        let bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let inner_bus = bus.clone();
        let o = order.clone();
        let _ready = bus.subscribe(Channel::Ready, move |_, pass| {
            o.borrow_mut().push(("ready start", pass));
            inner_bus.emit(PlaybackEvent::Redraw);
            o.borrow_mut().push(("ready end", pass));
        });
        let o = order.clone();
        let _redraw = bus.subscribe(Channel::Redraw, move |_, pass| o.borrow_mut().push(("redraw", pass)));

        bus.emit(PlaybackEvent::Ready { duration_secs: 1.0 });

        assert_eq!(
            *order.borrow(),
            vec![("ready start", 1), ("ready end", 1), ("redraw", 1)],
            "run to completion, same pass"
        );
    }

    #[test]
    fn test_handler_can_unsubscribe_another() {
        let bus = EventBus::new();
        let count = Rc::new(Cell::new(0));

        let victim_slot: Rc<RefCell<Option<SubscriptionHandle>>> = Rc::new(RefCell::new(None));
        let slot = victim_slot.clone();
        let _first = bus.subscribe(Channel::Pause, move |_, _| {
            slot.borrow_mut().take();
        });
        let c = count.clone();
        *victim_slot.borrow_mut() = Some(bus.subscribe(Channel::Pause, move |_, _| c.set(c.get() + 1)));

        bus.emit(PlaybackEvent::Pause);
        assert_eq!(count.get(), 0, "removed before its turn");
    }

    #[test]
    fn test_handle_outlives_bus() {
        let bus = EventBus::new();
        let handle = bus.subscribe(Channel::Play, |_, _| {});
        drop(bus);
        handle.unsubscribe();
    }
}
