//! Time source abstraction.
//!
//! # Responsibility
//! - Provide epoch-millisecond timestamps to the store and focus controller.
//! - Map timestamps onto local calendar days for review queries.
//!
//! # Invariants
//! - All persisted timestamps are Unix epoch milliseconds (UTC).

use chrono::{Local, NaiveDate, TimeZone};
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of "now" for every mutation.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Manually driven clock for tests and replay.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(start_ms),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance_ms(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// Local calendar day of an epoch-millisecond timestamp.
///
/// Returns `None` for out-of-range values and for ambiguous local times.
pub fn local_date(epoch_ms: i64) -> Option<NaiveDate> {
    Local
        .timestamp_millis_opt(epoch_ms)
        .single()
        .map(|at| at.date_naive())
}

#[cfg(test)]
mod tests {
    use super::{local_date, Clock, ManualClock};

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(1_000);
        clock.advance_ms(500);
        assert_eq!(clock.now_ms(), 1_500);
        clock.set(42);
        assert_eq!(clock.now_ms(), 42);
    }

    #[test]
    fn local_date_distinguishes_days_far_apart() {
        let day = 24 * 60 * 60 * 1000;
        let base = 1_700_000_000_000;
        assert_ne!(local_date(base), local_date(base + 3 * day));
        assert_eq!(local_date(base), local_date(base));
    }
}
