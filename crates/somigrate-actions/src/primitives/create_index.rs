use std::time::Duration;

use serde_json::Value;
use somigrate_core::constants::{es_error_types as es, MAPPING_VERSION_META_KEY};
use somigrate_core::errors::{ActionError, StoreError};
use somigrate_core::models::{IndexSpec, IndexStatus};
use somigrate_core::traits::DocumentStore;

use super::write_block::require_ack;
use super::{bounded, resolve_timeout, wait_for_index_status};
use crate::classifier::to_action_error;

/// Whether the index was created by this call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    /// Left over from an earlier attempt or created by another instance.
    AlreadyExisted,
}

/// Create `index` with `mappings`, then wait for it to be yellow. An index
/// that already exists counts as created: a crashed or concurrent attempt
/// got there first, and reindexing by id converges either way.
pub async fn create_index<S: DocumentStore>(
    store: &S,
    index: &str,
    mappings: &Value,
    timeout: Option<Duration>,
    status_timeout: Option<Duration>,
) -> Result<CreateOutcome, ActionError> {
    let timeout = resolve_timeout(timeout);
    let spec = IndexSpec::with_mappings(mappings.clone());

    let outcome = match bounded(timeout, store.create_index(index, &spec, timeout)).await {
        Ok(ack) => {
            require_ack(ack, "create index", index)?;
            CreateOutcome::Created
        }
        Err(e) if is_already_exists(&e) => {
            tracing::debug!(index, "create index: already exists, reusing it");
            CreateOutcome::AlreadyExisted
        }
        Err(e) => return Err(to_action_error(e, |_| None)),
    };

    wait_for_index_status(store, index, IndexStatus::Yellow, status_timeout).await?;
    Ok(outcome)
}

fn is_already_exists(err: &StoreError) -> bool {
    err.error_type() == Some(es::RESOURCE_ALREADY_EXISTS)
}

/// Copy of `mappings` with `_meta.mappingVersion` set.
pub fn with_mapping_version(mappings: &Value, version: &str) -> Value {
    let mut mappings = mappings.clone();
    if let Some(obj) = mappings.as_object_mut() {
        let meta = obj
            .entry("_meta")
            .or_insert_with(|| Value::Object(Default::default()));
        if let Some(meta) = meta.as_object_mut() {
            meta.insert(
                MAPPING_VERSION_META_KEY.to_string(),
                Value::String(version.to_string()),
            );
        }
    }
    mappings
}
