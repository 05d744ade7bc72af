//! Tracing setup: structured logging with span definitions and event types.

pub mod events;
pub mod spans;

use somigrate_core::config::ObservabilityConfig;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted for the log filter.
pub const LOG_ENV_VAR: &str = "SOMIGRATE_LOG";

/// Install the global subscriber. `SOMIGRATE_LOG` wins over `log_level`.
/// Returns false when a global subscriber was already installed.
pub fn init_tracing_from_config(config: &ObservabilityConfig) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    }
}
