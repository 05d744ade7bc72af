// Single source of truth for all default values.

use std::time::Duration;

// --- Actions ---
/// Default per-call timeout for every primitive action, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Timeout used by a primitive action when the caller passes none.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
/// Default timeout for index health waits, in seconds.
pub const DEFAULT_WAIT_FOR_STATUS_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BATCH_SIZE: usize = 1_000;

// --- Retry ---
pub const DEFAULT_MAX_RETRIES: u32 = 15;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_MAX_RETRY_DELAY_MS: u64 = 64_000;

// --- Migration ---
pub const DEFAULT_WAIT_FOR_MIGRATION_COMPLETION: bool = false;
pub const DEFAULT_MIGRATION_POLL_INTERVAL_MS: u64 = 2_000;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;
