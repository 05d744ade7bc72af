use std::time::Duration;

use somigrate_core::errors::ActionError;
use somigrate_core::models::IndexMap;
use somigrate_core::traits::DocumentStore;

use super::{bounded, resolve_timeout};
use crate::classifier::to_action_error;

/// Metadata of every index matching one of `names` (index or alias).
/// Missing indices are absent from the map, not an error.
pub async fn fetch_indices<S: DocumentStore>(
    store: &S,
    names: &[String],
    timeout: Option<Duration>,
) -> Result<IndexMap, ActionError> {
    bounded(resolve_timeout(timeout), store.get_indices(names))
        .await
        .map_err(|e| to_action_error(e, |_| None))
}

/// Whether `index` exists as a concrete index.
pub async fn check_index_exists<S: DocumentStore>(
    store: &S,
    index: &str,
    timeout: Option<Duration>,
) -> Result<bool, ActionError> {
    let found = fetch_indices(store, &[index.to_string()], timeout).await?;
    Ok(found.contains_key(index))
}
