use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::MigrationStrategy;

/// Pipeline-shape switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// When true this node never migrates itself; it waits until another
    /// node has published the version alias.
    pub wait_for_migration_completion: bool,
    /// How the target index gets its documents: "reindex" or "clone".
    pub strategy: MigrationStrategy,
    /// Pause between two polls of a waiting node, in milliseconds.
    pub migration_poll_interval_ms: u64,
    /// How long a waiting node polls before giving up, in seconds. Unset
    /// means it waits for as long as the other node takes.
    pub migration_wait_timeout_secs: Option<u64>,
}

impl PipelineConfig {
    pub fn migration_poll_interval(&self) -> Duration {
        Duration::from_millis(self.migration_poll_interval_ms)
    }

    pub fn migration_wait_timeout(&self) -> Option<Duration> {
        self.migration_wait_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            wait_for_migration_completion: defaults::DEFAULT_WAIT_FOR_MIGRATION_COMPLETION,
            strategy: MigrationStrategy::default(),
            migration_poll_interval_ms: defaults::DEFAULT_MIGRATION_POLL_INTERVAL_MS,
            migration_wait_timeout_secs: None,
        }
    }
}
