use std::time::Duration;

use somigrate_core::errors::ActionError;
use somigrate_core::models::Acknowledged;
use somigrate_core::traits::DocumentStore;

use super::{bounded, resolve_timeout};
use crate::classifier::{index_not_found, to_action_error};

/// Make `index` read-only. Succeeds when the block is already set.
pub async fn set_write_block<S: DocumentStore>(
    store: &S,
    index: &str,
    timeout: Option<Duration>,
) -> Result<(), ActionError> {
    let timeout = resolve_timeout(timeout);
    let ack = bounded(timeout, store.add_write_block(index, timeout))
        .await
        .map_err(|e| to_action_error(e, |e| index_not_found(e, index)))?;
    require_ack(ack, "add write block", index)
}

/// Clear the read-only flag of `index`. Succeeds when it is already clear.
pub async fn remove_write_block<S: DocumentStore>(
    store: &S,
    index: &str,
    timeout: Option<Duration>,
) -> Result<(), ActionError> {
    let timeout = resolve_timeout(timeout);
    let ack = bounded(timeout, store.remove_write_block(index, timeout))
        .await
        .map_err(|e| to_action_error(e, |e| index_not_found(e, index)))?;
    require_ack(ack, "remove write block", index)
}

/// An unacknowledged settings change timed out on the backend side; it is
/// safe to send again.
pub(crate) fn require_ack(ack: Acknowledged, what: &str, index: &str) -> Result<(), ActionError> {
    if ack.acknowledged && ack.shards_acknowledged {
        Ok(())
    } else {
        Err(ActionError::RetryableEsClientError {
            message: format!("{what} on {index} was not acknowledged before the timeout"),
            status: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use somigrate_store::{empty_mappings, InMemoryStore, MemIndex, StoreOp};

    fn store() -> InMemoryStore {
        InMemoryStore::new().with_index("kibana_1", MemIndex::new(empty_mappings()))
    }

    #[tokio::test]
    async fn set_write_block_twice_is_idempotent() {
        let store = store();
        set_write_block(&store, "kibana_1", None).await.unwrap();
        set_write_block(&store, "kibana_1", None).await.unwrap();
        assert!(store.index("kibana_1").unwrap().write_block);
        assert_eq!(store.calls(StoreOp::AddWriteBlock), 2);
    }

    #[tokio::test]
    async fn remove_write_block_twice_is_idempotent() {
        let store = store();
        set_write_block(&store, "kibana_1", None).await.unwrap();
        remove_write_block(&store, "kibana_1", None).await.unwrap();
        remove_write_block(&store, "kibana_1", None).await.unwrap();
        assert!(!store.index("kibana_1").unwrap().write_block);
    }

    #[tokio::test]
    async fn missing_index_is_index_not_found() {
        let store = store();
        let err = set_write_block(&store, "kibana_9", None).await.unwrap_err();
        assert_eq!(
            err,
            ActionError::IndexNotFound {
                index: "kibana_9".into()
            }
        );
        let err = remove_write_block(&store, "kibana_9", None).await.unwrap_err();
        assert_eq!(err.tag(), "index_not_found_exception");
    }

    #[test]
    fn unacknowledged_change_is_retryable() {
        let ack = Acknowledged {
            acknowledged: true,
            shards_acknowledged: false,
        };
        let err = require_ack(ack, "add write block", "kibana_1").unwrap_err();
        assert!(err.is_retryable());
    }
}
