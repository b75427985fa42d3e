//! # Injectable Clocks
//!
//! Every timestamp that ends up inside a crystal (event node timestamps, run
//! durations, `crystallizedAt`) is read from a [`Clock`]. Under test a
//! deterministic clock makes the whole crystal, including its seal hash,
//! reproducible byte for byte.
//!
//! - [`SystemClock`] — wall clock in Unix milliseconds (UTC).
//! - [`FixedClock`] — always returns the same instant.
//! - [`SteppingClock`] — starts at an instant and advances by a fixed step on
//!   every read, giving a deterministic strictly increasing sequence.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

/// A source of millisecond timestamps.
///
/// Implementations must be `Send + Sync` so one clock can be shared between
/// the crystallizer and the dispatchers it creates.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds.
    fn now_ms(&self) -> u64;
}

/// Wall clock backed by `chrono::Utc`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        // Instants before the epoch clamp to zero.
        u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    at_ms: u64,
}

impl FixedClock {
    /// Create a clock that always reports `at_ms`.
    pub fn new(at_ms: u64) -> Self {
        Self { at_ms }
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> u64 {
        self.at_ms
    }
}

/// A clock that advances by `step_ms` on every read.
///
/// The first read returns `start_ms`.
#[derive(Debug)]
pub struct SteppingClock {
    next_ms: AtomicU64,
    step_ms: u64,
}

impl SteppingClock {
    /// Create a stepping clock.
    pub fn new(start_ms: u64, step_ms: u64) -> Self {
        Self {
            next_ms: AtomicU64::new(start_ms),
            step_ms,
        }
    }

    /// Number of milliseconds added per read.
    pub fn step_ms(&self) -> u64 {
        self.step_ms
    }
}

impl Clock for SteppingClock {
    fn now_ms(&self) -> u64 {
        self.next_ms.fetch_add(self.step_ms, Ordering::SeqCst)
    }
}
