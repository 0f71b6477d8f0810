//! Time sources for the core.
//!
//! Timestamps are plain nanosecond counts; nothing in the core deals with
//! time zones or calendars.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use crate::repository::Timestamp;

/// A source of nanosecond timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time in nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        // Saturates outside the range representable as i64 nanoseconds (years 1677..2262).
        match Utc::now().timestamp_nanos_opt() {
            Some(nanos) => nanos.max(0) as Timestamp,
            None => Timestamp::MAX,
        }
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Move the clock forward by `nanos`.
    pub fn advance(&self, nanos: u64) {
        self.now.fetch_add(nanos, Ordering::SeqCst);
    }

    /// Set the clock to an arbitrary value, including into the past.
    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_recent() {
        // 2020-01-01T00:00:00Z in nanoseconds.
        assert!(SystemClock.now() > 1_577_836_800_000_000_000);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(100);
        assert_eq!(clock.now(), 100);
        clock.advance(5);
        assert_eq!(clock.now(), 105);
        clock.set(1);
        assert_eq!(clock.now(), 1);
    }
}
