//! Guarded actions: a local precondition on the index pair, then the
//! primitive. The guard never reaches the backend.

use std::time::Duration;

use somigrate_core::errors::ActionError;
use somigrate_core::models::AliasAction;
use somigrate_core::traits::DocumentStore;

use crate::primitives::{set_write_block, update_aliases};

/// The index pair of a guarded write.
#[derive(Debug, Clone, Copy)]
pub struct SafeWriteBlockParams<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub timeout: Option<Duration>,
}

/// Write-block `source`, refusing when it is also the `target`: blocking the
/// index that is about to serve as the live index would halt all writes.
///
/// Errors from [`set_write_block`] are returned unchanged, so the result is
/// either `source_equals_target` or one of the primitive's tags.
pub async fn safe_write_block<S: DocumentStore>(
    store: &S,
    params: SafeWriteBlockParams<'_>,
) -> Result<(), ActionError> {
    ensure_distinct(params.source, params.target)?;
    set_write_block(store, params.source, params.timeout).await
}

/// Apply an alias batch moving aliases from `source` to `target`, with the
/// same guard as [`safe_write_block`].
pub async fn safe_update_aliases<S: DocumentStore>(
    store: &S,
    source: &str,
    target: &str,
    actions: &[AliasAction],
    timeout: Option<Duration>,
) -> Result<(), ActionError> {
    ensure_distinct(source, target)?;
    update_aliases(store, actions, timeout).await
}

fn ensure_distinct(source: &str, target: &str) -> Result<(), ActionError> {
    if source == target {
        return Err(ActionError::SourceEqualsTarget {
            index: source.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use somigrate_core::errors::StoreError;
    use somigrate_store::{empty_mappings, InMemoryStore, MemIndex, StoreOp};

    fn store() -> InMemoryStore {
        InMemoryStore::new()
            .with_index("kibana_1", MemIndex::new(empty_mappings()).with_alias(".kibana"))
            .with_index("kibana_2", MemIndex::new(empty_mappings()))
    }

    fn params<'a>(source: &'a str, target: &'a str) -> SafeWriteBlockParams<'a> {
        SafeWriteBlockParams {
            source,
            target,
            timeout: None,
        }
    }

    #[tokio::test]
    async fn same_index_is_rejected_before_any_call() {
        let store = store();
        let err = safe_write_block(&store, params("kibana_1", "kibana_1"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ActionError::SourceEqualsTarget {
                index: "kibana_1".into()
            }
        );
        assert_eq!(store.calls(StoreOp::AddWriteBlock), 0);
        assert!(!store.index("kibana_1").unwrap().write_block);
    }

    #[tokio::test]
    async fn distinct_pair_blocks_the_source_only() {
        let store = store();
        safe_write_block(&store, params("kibana_1", "kibana_2")).await.unwrap();
        assert!(store.index("kibana_1").unwrap().write_block);
        assert!(!store.index("kibana_2").unwrap().write_block);
    }

    #[tokio::test]
    async fn delegate_errors_pass_through_unchanged() {
        let store = store();
        store.fail_times(
            StoreOp::AddWriteBlock,
            StoreError::response(503, "unavailable", "busy"),
            1,
        );
        let err = safe_write_block(&store, params("kibana_1", "kibana_2"))
            .await
            .unwrap_err();
        assert!(err.is_retryable());

        let err = safe_write_block(&store, params("kibana_9", "kibana_2"))
            .await
            .unwrap_err();
        assert_eq!(err.tag(), "index_not_found_exception");
    }

    #[tokio::test]
    async fn alias_swap_on_same_index_is_rejected() {
        let store = store();
        let actions = [
            AliasAction::remove("kibana_1", ".kibana"),
            AliasAction::add("kibana_1", ".kibana"),
        ];
        let err = safe_update_aliases(&store, "kibana_1", "kibana_1", &actions, None)
            .await
            .unwrap_err();
        assert_eq!(err.tag(), "source_equals_target");
        assert_eq!(store.calls(StoreOp::UpdateAliases), 0);
    }
}
