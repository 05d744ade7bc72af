//! Primitive actions: one backend operation each, idempotent, returning a
//! tagged [`ActionError`](somigrate_core::errors::ActionError) instead of
//! raw store errors.
//!
//! Every primitive takes `timeout: Option<Duration>`; `None` means
//! [`DEFAULT_TIMEOUT`]. The backend gets the timeout as its own request
//! timeout and the client waits at most that long plus a fixed grace; an
//! expired wait is reported as a retryable transport timeout.

pub mod clone_index;
pub mod create_index;
pub mod fetch_indices;
pub mod refresh;
pub mod reindex;
pub mod update_aliases;
pub mod verify;
pub mod wait_for_status;
pub mod write_block;

use std::future::Future;
use std::time::Duration;

use somigrate_core::config::defaults::DEFAULT_TIMEOUT;
use somigrate_core::constants::REQUEST_TIMEOUT_GRACE_MS;
use somigrate_core::errors::{StoreError, TransportErrorKind};

pub use clone_index::{clone_index, CloneOutcome};
pub use create_index::{create_index, with_mapping_version, CreateOutcome};
pub use fetch_indices::{check_index_exists, fetch_indices};
pub use refresh::refresh_index;
pub use reindex::{reindex, ReindexParams, ReindexSummary};
pub use update_aliases::update_aliases;
pub use verify::{verify_index_equality, VerifyMode, VerifyOutcome};
pub use wait_for_status::wait_for_index_status;
pub use write_block::{remove_write_block, set_write_block};

/// The effective timeout of a call.
pub fn resolve_timeout(timeout: Option<Duration>) -> Duration {
    timeout.unwrap_or(DEFAULT_TIMEOUT)
}

/// Run a store call, giving up `timeout` + grace after it started.
pub(crate) async fn bounded<T, F>(timeout: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    let limit = timeout + Duration::from_millis(REQUEST_TIMEOUT_GRACE_MS);
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::transport(
            TransportErrorKind::Timeout,
            format!("request timed out after {}ms", limit.as_millis()),
        )),
    }
}
