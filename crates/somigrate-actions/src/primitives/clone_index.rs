use std::time::Duration;

use somigrate_core::constants::es_error_types as es;
use somigrate_core::errors::ActionError;
use somigrate_core::models::{IndexInfo, IndexStatus};
use somigrate_core::traits::DocumentStore;

use super::write_block::require_ack;
use super::{bounded, fetch_indices, resolve_timeout, wait_for_index_status};
use crate::classifier::{index_not_found, to_action_error};

/// Whether the clone was made by this call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneOutcome {
    Cloned,
    /// Target already existed with the source's settings.
    AlreadyExisted,
}

/// Clone `source` into `target`; the target carries the source's write
/// block. When `target` already exists with the same shard count and
/// mappings the call is a no-op, so a crash mid-clone resumes cleanly. Waits
/// for the target to be green.
pub async fn clone_index<S: DocumentStore>(
    store: &S,
    source: &str,
    target: &str,
    timeout: Option<Duration>,
    status_timeout: Option<Duration>,
) -> Result<CloneOutcome, ActionError> {
    let timeout = resolve_timeout(timeout);
    let names = [source.to_string(), target.to_string()];
    let existing = fetch_indices(store, &names, Some(timeout)).await?;
    let Some(source_info) = existing.get(source) else {
        return Err(ActionError::IndexNotFound {
            index: source.to_string(),
        });
    };

    let outcome = if let Some(target_info) = existing.get(target) {
        ensure_matches(source_info, target_info, target)?;
        CloneOutcome::AlreadyExisted
    } else {
        match bounded(timeout, store.clone_index(source, target, timeout)).await {
            Ok(ack) => {
                require_ack(ack, "clone index", target)?;
                CloneOutcome::Cloned
            }
            Err(e) if e.error_type() == Some(es::RESOURCE_ALREADY_EXISTS) => {
                // Another instance cloned between our check and our call.
                tracing::debug!(source, target, "clone index: lost the race, comparing targets");
                let raced = fetch_indices(store, &[target.to_string()], Some(timeout)).await?;
                match raced.get(target) {
                    Some(target_info) => ensure_matches(source_info, target_info, target)?,
                    None => {
                        return Err(ActionError::RetryableEsClientError {
                            message: format!("clone target {target} vanished after a conflict"),
                            status: e.status(),
                        })
                    }
                }
                CloneOutcome::AlreadyExisted
            }
            Err(e) => return Err(to_action_error(e, |e| index_not_found(e, source))),
        }
    };

    wait_for_index_status(store, target, IndexStatus::Green, status_timeout).await?;
    Ok(outcome)
}

fn ensure_matches(
    source: &IndexInfo,
    target: &IndexInfo,
    target_name: &str,
) -> Result<(), ActionError> {
    if source.number_of_shards != target.number_of_shards {
        return Err(ActionError::CloneTargetMismatch {
            target: target_name.to_string(),
            reason: format!(
                "{} shards, expected {}",
                target.number_of_shards, source.number_of_shards
            ),
        });
    }
    if source.mappings != target.mappings {
        return Err(ActionError::CloneTargetMismatch {
            target: target_name.to_string(),
            reason: "mappings differ from the source".to_string(),
        });
    }
    Ok(())
}
