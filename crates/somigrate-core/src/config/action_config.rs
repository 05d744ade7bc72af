use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Per-action limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    /// Timeout applied to each backend call, in seconds.
    pub timeout_secs: u64,
    /// Timeout for yellow/green health waits, in seconds.
    pub wait_for_status_timeout_secs: u64,
    /// Documents read and bulk-written per reindex batch.
    pub batch_size: usize,
}

impl ActionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn wait_for_status_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_for_status_timeout_secs)
    }
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: defaults::DEFAULT_TIMEOUT_SECS,
            wait_for_status_timeout_secs: defaults::DEFAULT_WAIT_FOR_STATUS_TIMEOUT_SECS,
            batch_size: defaults::DEFAULT_BATCH_SIZE,
        }
    }
}
