//! Trailing-edge throttle for high-frequency pointer input.
//!
//! The first value in a quiet period passes straight through and opens a
//! window of `interval`. Values arriving inside the window replace each other;
//! the latest one is released by [`Throttle::poll`] once the window closes,
//! which opens a new window. A burst therefore always ends with exactly one
//! trailing value.
//!
//! The clock is supplied by the caller, so the throttle is independent of any
//! runtime and fully deterministic under test.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Throttle<T> {
    interval: Duration,
    window_ends: Option<Instant>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            window_ends: None,
            pending: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Offer a value. Returns it immediately when no window is open.
    pub fn call(&mut self, value: T, now: Instant) -> Option<T> {
        match self.window_ends {
            Some(end) if now < end => {
                self.pending = Some(value);
                None
            }
            _ => {
                // A stale pending value is superseded by this newer one
                self.pending = None;
                self.window_ends = Some(now + self.interval);
                Some(value)
            }
        }
    }

    /// Release the trailing value once the window has closed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.window_ends {
            Some(end) if now >= end => match self.pending.take() {
                Some(value) => {
                    self.window_ends = Some(now + self.interval);
                    Some(value)
                }
                None => {
                    self.window_ends = None;
                    None
                }
            },
            _ => None,
        }
    }

    /// When the pending value becomes due, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().and(self.window_ends)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending value regardless of the window and reset.
    pub fn flush(&mut self) -> Option<T> {
        self.window_ends = None;
        self.pending.take()
    }
}
