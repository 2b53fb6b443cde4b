//! Time source abstraction.
//!
//! Coupon validity checks and order timestamps read "now" through a [`Clock`]
//! so tests can pin time with [`FixedClock`].

use chrono::{DateTime, Duration, NaiveTime, Utc};
use parking_lot::Mutex;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Midnight (UTC) of the current day.
    fn today(&self) -> DateTime<Utc> {
        start_of_day(self.now())
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a settable instant.
#[derive(Debug)]
pub struct FixedClock {
    instant: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Create a clock frozen at `instant`.
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Mutex::new(instant),
        }
    }

    /// Move the clock to `instant`.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.instant.lock() = instant;
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut instant = self.instant.lock();
        *instant += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.lock()
    }
}

/// Truncate an instant to midnight UTC.
pub fn start_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.date_naive().and_time(NaiveTime::MIN).and_utc()
}
