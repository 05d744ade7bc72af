use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Retry budget and backoff shape for retryable step failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries allowed per step before the migration turns fatal.
    pub max_retries: u32,
    /// Base delay; the n-th retry waits `base * 2^n`.
    pub base_delay_ms: u64,
    /// Upper bound for a single backoff delay.
    pub max_delay_ms: u64,
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: defaults::DEFAULT_MAX_RETRIES,
            base_delay_ms: defaults::DEFAULT_RETRY_BASE_DELAY_MS,
            max_delay_ms: defaults::DEFAULT_MAX_RETRY_DELAY_MS,
        }
    }
}
