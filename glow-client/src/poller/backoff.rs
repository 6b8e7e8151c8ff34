//! Backoff policy for failed status checks

use std::time::Duration;

/// Capped exponential backoff
///
/// After `n` consecutive failures the next check waits
/// `min(base * factor^n, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Delay unit; also the regular interval between successful checks
    pub base: Duration,
    /// Ceiling for any single delay
    pub max: Duration,
    /// Growth factor per consecutive failure
    pub factor: u32,
}

impl BackoffPolicy {
    pub const DEFAULT_MAX: Duration = Duration::from_secs(60);

    /// Creates a doubling policy with the default 60s ceiling
    pub fn new(base: Duration) -> Self {
        Self {
            base,
            max: Self::DEFAULT_MAX,
            factor: 2,
        }
    }

    /// Sets the delay ceiling
    pub fn with_max(mut self, max: Duration) -> Self {
        self.max = max;
        self
    }

    /// Delay to wait after `consecutive_errors` failures in a row
    pub fn delay_for(&self, consecutive_errors: u32) -> Duration {
        let multiplier = self.factor.saturating_pow(consecutive_errors);
        self.base.saturating_mul(multiplier).min(self.max)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}
