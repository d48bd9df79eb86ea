//! Time sources
//!
//! Cooldowns and distribution periods are gated on an external clock that
//! never moves backwards. `SystemClock` reads wall time; `ManualClock` is
//! advanced explicitly and drives simulations and tests deterministically.

use crate::Timestamp;
use parking_lot::Mutex;

/// Monotonically non-decreasing source of unix seconds
pub trait Clock: Send + Sync {
    /// Current time in unix seconds
    fn now(&self) -> Timestamp;
}

/// Wall clock (UTC)
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now().timestamp()
    }
}

/// Manually advanced clock
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    /// Create a clock starting at `start`
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move time forward by `secs` and return the new time
    pub fn advance(&self, secs: i64) -> Timestamp {
        let mut now = self.now.lock();
        *now += secs.max(0);
        *now
    }

    /// Jump to `timestamp`; earlier values are ignored
    pub fn set(&self, timestamp: Timestamp) -> Timestamp {
        let mut now = self.now.lock();
        if timestamp > *now {
            *now = timestamp;
        } else if timestamp < *now {
            tracing::debug!(requested = timestamp, current = *now, "ignoring backwards clock move");
        }
        *now
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(0)
    }
}
