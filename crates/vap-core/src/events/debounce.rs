//! Coalesce-until-quiet scheduling
//!
//! A burst of signals collapses into one delivery of the latest value, once
//! no new signal has arrived for the configured delay. Nothing here owns a
//! timer: the host polls on its own tick.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Time source for the scheduler
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Holds the latest signalled value until the signal goes quiet
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace the pending value and push the deadline out
    pub fn signal(&mut self, now: Instant, value: T) {
        self.pending = Some((now + self.delay, value));
    }

    /// Take the value if its deadline has passed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if now >= *deadline => self.pending.take().map(|(_, value)| value),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(150);

    #[test]
    fn test_burst_collapses_to_last_value() {
        let clock = ManualClock::new();
        let mut debouncer = Debouncer::new(DELAY);

        for width in [800, 810, 820, 830] {
            debouncer.signal(clock.now(), width);
            clock.advance(Duration::from_millis(50));
            assert_eq!(debouncer.poll(clock.now()), None, "still inside the quiet period");
        }

        clock.advance(DELAY);
        assert_eq!(debouncer.poll(clock.now()), Some(830));
        assert_eq!(debouncer.poll(clock.now()), None, "delivered once");
    }

    #[test]
    fn test_fires_exactly_at_deadline() {
        let clock = ManualClock::new();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.signal(clock.now(), ());
        assert_eq!(debouncer.deadline(), Some(clock.now() + DELAY));

        clock.advance(DELAY);
        assert_eq!(debouncer.poll(clock.now()), Some(()));
    }

    #[test]
    fn test_cancel_drops_pending() {
        let clock = ManualClock::new();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.signal(clock.now(), 1);
        debouncer.cancel();
        clock.advance(DELAY * 2);
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(clock.now()), None);
    }
}
