//! Quiescence timer: coalesces a burst of changes into the last value.
//!
//! Time is passed in explicitly so the caller decides how to sleep (the main
//! loop uses `tokio::time::sleep_until` on [`Debouncer::deadline`]).

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Record a change.  Replaces any pending value and restarts the window.
    pub fn touch(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.window));
    }

    /// When the pending value becomes due, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    /// Take the pending value if its window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.pending {
            Some((_, due)) if now >= due => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }
}
