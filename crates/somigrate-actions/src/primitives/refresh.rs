use std::time::Duration;

use somigrate_core::errors::ActionError;
use somigrate_core::traits::DocumentStore;

use super::{bounded, resolve_timeout};
use crate::classifier::{index_not_found, to_action_error};

/// Make recent writes to `index` visible to search.
pub async fn refresh_index<S: DocumentStore>(
    store: &S,
    index: &str,
    timeout: Option<Duration>,
) -> Result<(), ActionError> {
    bounded(resolve_timeout(timeout), store.refresh(index))
        .await
        .map_err(|e| to_action_error(e, |e| index_not_found(e, index)))
}
