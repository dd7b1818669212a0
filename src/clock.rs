//! Injectable clock abstraction.
//!
//! Window evaluation, retry timing and monitoring cadence are all
//! time-dependent; components take a clock rather than calling
//! `Utc::now()` directly so tests can pin the current instant.

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub type SharedClock = Arc<dyn Clock>;

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a fixed instant, settable from tests.
#[derive(Debug, Clone)]
pub struct FixedClock {
    instant: Arc<parking_lot::RwLock<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Arc::new(parking_lot::RwLock::new(instant)),
        }
    }

    /// Move the pinned instant (e.g. to simulate elapsed time between retries).
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.instant.write() = instant;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_is_settable() {
        let t0 = Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap();
        let t1 = t0 + chrono::Duration::hours(3);

        let clock = FixedClock::new(t0);
        assert_eq!(clock.now(), t0);

        clock.set(t1);
        assert_eq!(clock.now(), t1);
    }
}
