//! Lamport logical clock.
//!
//! Every process (each client and the relay server) owns exactly one
//! [`LamportClock`]. Only its values travel between processes, embedded in
//! [`ChatMessage`](crate::ChatMessage) frames.
//!
//! - [`LamportClock::tick`] stamps a locally originated event.
//! - [`LamportClock::observe`] folds a received timestamp into the clock.
//!
//! Both operations are a single atomic read-modify-write, so concurrent callers
//! within one process always receive distinct, strictly increasing values.

use std::sync::atomic::{AtomicI64, Ordering};

/// A process-local Lamport clock.
#[derive(Debug, Default)]
pub struct LamportClock {
    value: AtomicI64,
}

impl LamportClock {
    /// Create a clock starting at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            value: AtomicI64::new(0),
        }
    }

    /// Create a clock whose next `tick` returns `value + 1`.
    #[must_use]
    pub const fn starting_at(value: i64) -> Self {
        Self {
            value: AtomicI64::new(value),
        }
    }

    /// Advance the clock for a locally originated event and return the new value.
    pub fn tick(&self) -> i64 {
        self.advance(|current| current.saturating_add(1))
    }

    /// Apply the Lamport receive rule: `value = max(value, received) + 1`.
    ///
    /// The returned value is strictly greater than both the previous local
    /// value and `received` (saturating at `i64::MAX`).
    pub fn observe(&self, received: i64) -> i64 {
        self.advance(|current| current.max(received).saturating_add(1))
    }

    /// Current value without advancing.
    #[must_use]
    pub fn current(&self) -> i64 {
        self.value.load(Ordering::Acquire)
    }

    fn advance(&self, step: impl Fn(i64) -> i64) -> i64 {
        // The closure never returns None, so both arms carry the previous value.
        let previous = self
            .value
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(step(current))
            })
            .unwrap_or_else(|current| current);
        step(previous)
    }
}
