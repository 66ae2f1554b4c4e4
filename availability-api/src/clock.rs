//!
//! Source of the current time.
//!
//! Every time-dependent decision (temporary block expiry, validation of `until`)
//! goes through [Clock] so it can be controlled in tests.
//!

use std::{
    sync::{Mutex, PoisonError},
    time::Duration,
};
use time::OffsetDateTime;

pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

///
/// Clock that only moves when told to.
///
pub struct ManualClock {
    now: Mutex<OffsetDateTime>,
}

impl ManualClock {
    pub fn new(now: OffsetDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: OffsetDateTime) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += duration;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn manual_clock_advance() {
        let clock = ManualClock::new(datetime!(2030-01-01 12:00 UTC));

        clock.advance(Duration::from_secs(90));

        assert_eq!(clock.now(), datetime!(2030-01-01 12:01:30 UTC));
    }

    #[test]
    fn manual_clock_set() {
        let clock = ManualClock::new(datetime!(2030-01-01 12:00 UTC));

        clock.set(datetime!(2031-06-01 08:30 UTC));

        assert_eq!(clock.now(), datetime!(2031-06-01 08:30 UTC));
    }
}
