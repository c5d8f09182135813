// Minimum-interval policy between samples.

use std::path::Path;
use std::time::Duration;

use crate::error::CoreError;
use crate::store;

/// Default gap required since the last sample: five minutes short of the
/// store step, so an hourly schedule with some jitter still lands every run.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(3300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Update,
    /// Too soon; `since_last` seconds have passed since the last sample.
    Skip { since_last: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    min_interval: Duration,
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self { min_interval }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Strictly more than the minimum interval must have passed.
    pub fn allows(&self, last_update: i64, now: i64) -> bool {
        let min = i64::try_from(self.min_interval.as_secs()).unwrap_or(i64::MAX);
        now.saturating_sub(last_update) > min
    }

    pub fn decide_at(&self, last_update: i64, now: i64) -> Decision {
        if self.allows(last_update, now) {
            Decision::Update
        } else {
            Decision::Skip {
                since_last: now.saturating_sub(last_update),
            }
        }
    }

    /// Read the store's last update and decide.
    pub fn decide(&self, path: &Path, now: i64) -> Result<Decision, CoreError> {
        let last = store::last_update(path)?;
        Ok(self.decide_at(last, now))
    }

    pub fn should_update(&self, path: &Path, now: i64) -> Result<bool, CoreError> {
        Ok(self.decide(path, now)? == Decision::Update)
    }
}
