use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;

/// Longest accepted lockout window (one year)
pub const MAX_LOCKOUT_MINUTES: i64 = 525_600;

/// Failed-login lockout settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LockoutPolicy {
    /// Whether newly registered accounts participate in lockout
    pub allowed_for_new_users: bool,
    pub max_failed_attempts: i32,
    pub lockout_minutes: i64,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            allowed_for_new_users: true,
            max_failed_attempts: 5,
            lockout_minutes: 5,
        }
    }
}

impl LockoutPolicy {
    /// `None` when `lockout_minutes` does not fit a `TimeDelta`.
    pub fn duration(&self) -> Option<TimeDelta> {
        TimeDelta::try_minutes(self.lockout_minutes)
    }

    pub fn should_lock(&self, failed_count: i32) -> bool {
        failed_count >= self.max_failed_attempts
    }

    /// `None` when the end would overflow the representable date range.
    pub fn lockout_end(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        now.checked_add_signed(self.duration()?)
    }
}

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
pub(crate) mod test_clock {
    use std::sync::Mutex;

    use super::*;

    /// Manually advanced clock
    pub struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        pub fn new() -> Self {
            Self(Mutex::new(Utc::now()))
        }

        pub fn advance(&self, by: TimeDelta) {
            let mut now = self.0.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }
}
