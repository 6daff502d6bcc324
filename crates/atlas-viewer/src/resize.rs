//! Coalesces bursts of resize notifications.

use std::time::{Duration, Instant};

use crate::viewport::Viewport;

/// Holds the latest viewport until no newer one has arrived for `delay`.
#[derive(Debug)]
pub struct ResizeDebouncer {
    delay: Duration,
    pending: Option<(Viewport, Instant)>,
}

impl ResizeDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Change the quiet period. A pending resize is measured against the new one.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Record a resize observed at `now`, replacing any earlier one.
    pub fn notify(&mut self, viewport: Viewport, now: Instant) {
        self.pending = Some((viewport, now));
    }

    /// When the pending resize becomes due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, at)| at + self.delay)
    }

    /// Take the pending viewport once it has been quiet for `delay`.
    pub fn poll(&mut self, now: Instant) -> Option<Viewport> {
        let deadline = self.deadline()?;
        if now < deadline {
            return None;
        }
        self.pending.take().map(|(viewport, _)| viewport)
    }

    /// Take the pending viewport regardless of the deadline.
    pub fn flush(&mut self) -> Option<Viewport> {
        self.pending.take().map(|(viewport, _)| viewport)
    }
}
