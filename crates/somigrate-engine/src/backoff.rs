//! Exponential backoff for retryable step failures.

use std::time::Duration;

use somigrate_core::config::RetryConfig;

/// How long to wait before replaying a step, and when to give up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed per step; the step runs at most `max_retries + 1` times.
    pub max_retries: u32,
    /// Delay unit; the n-th retry waits `base_delay * 2^n`.
    pub base_delay: Duration,
    /// Cap for a single delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Delay before the `retry_count`-th retry (1-based), capped at `max_delay`.
    pub fn delay(&self, retry_count: u32) -> Duration {
        let factor = 2u32.checked_pow(retry_count).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// True once `retry_count` retries exceed the budget.
    pub fn exhausted(&self, retry_count: u32) -> bool {
        retry_count > self.max_retries
    }

    /// Total invocations of a step that exhausts the budget.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: config.base_delay(),
            max_delay: config.max_delay(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}
