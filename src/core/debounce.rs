use instant::Instant;
use std::time::Duration;

/// Coalesces a burst of events into the last one, released after a quiet window.
///
/// Scheduling again before the window elapses cancels the pending value and restarts
/// the window. Polled from the frame loop.
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    pub fn schedule(&mut self, now: Instant, value: T) {
        self.pending = Some((now + self.quiet, value));
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, v)| v)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending value once its window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((due, _)) if now >= *due => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }
}
