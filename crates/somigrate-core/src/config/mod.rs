pub mod action_config;
pub mod defaults;
pub mod migration_config;
pub mod observability_config;
pub mod retry_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use action_config::ActionConfig;
pub use migration_config::PipelineConfig;
pub use observability_config::ObservabilityConfig;
pub use retry_config::RetryConfig;

use crate::errors::{ConfigError, MigrateResult};

/// Top-level migration configuration aggregating all sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    pub actions: ActionConfig,
    pub retry: RetryConfig,
    pub pipeline: PipelineConfig,
    pub observability: ObservabilityConfig,
}

impl MigrationConfig {
    /// Parse a TOML string. Missing sections and fields fall back to defaults.
    pub fn from_toml(toml_str: &str) -> MigrateResult<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: &Path) -> MigrateResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Reject values that would stall or spin the pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.actions.batch_size == 0 {
            return Err(ConfigError::Invalid {
                field: "actions.batch_size".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.actions.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "actions.timeout_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.actions.wait_for_status_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "actions.wait_for_status_timeout_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.pipeline.migration_poll_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "pipeline.migration_poll_interval_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.retry.max_delay_ms < self.retry.base_delay_ms {
            return Err(ConfigError::Invalid {
                field: "retry.max_delay_ms".into(),
                reason: format!(
                    "{} is below retry.base_delay_ms {}",
                    self.retry.max_delay_ms, self.retry.base_delay_ms
                ),
            });
        }
        Ok(())
    }
}
