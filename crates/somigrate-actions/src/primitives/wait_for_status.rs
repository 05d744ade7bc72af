use std::time::Duration;

use somigrate_core::errors::ActionError;
use somigrate_core::models::IndexStatus;
use somigrate_core::traits::DocumentStore;

use super::{bounded, resolve_timeout};
use crate::classifier::{index_not_found, to_action_error};

/// Wait until `index` is at least `status`. A health wait that times out is
/// `index_not_yellow_timeout` / `index_not_green_timeout`, both retryable.
pub async fn wait_for_index_status<S: DocumentStore>(
    store: &S,
    index: &str,
    status: IndexStatus,
    timeout: Option<Duration>,
) -> Result<(), ActionError> {
    let timeout = resolve_timeout(timeout);
    let health = bounded(timeout, store.cluster_health(index, status, timeout))
        .await
        .map_err(|e| to_action_error(e, |e| index_not_found(e, index)))?;

    if !health.timed_out && health.status.satisfies(status) {
        return Ok(());
    }

    let message = format!(
        "timed out after {}s waiting for {} status, index is {}",
        timeout.as_secs(),
        status.as_str(),
        health.status.as_str()
    );
    Err(match status {
        IndexStatus::Green => ActionError::IndexNotGreenTimeout {
            index: index.to_string(),
            message,
        },
        IndexStatus::Yellow | IndexStatus::Red => ActionError::IndexNotYellowTimeout {
            index: index.to_string(),
            message,
        },
    })
}
