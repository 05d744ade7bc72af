use std::time::Duration;

use somigrate_core::constants::es_error_types as es;
use somigrate_core::errors::{ActionError, StoreError};
use somigrate_core::models::AliasAction;
use somigrate_core::traits::DocumentStore;

use super::write_block::require_ack;
use super::{bounded, resolve_timeout};
use crate::classifier::{index_not_found, to_action_error};

/// Apply `actions` as one atomic batch: either every action takes effect
/// or none does.
///
/// Error tags:
/// - `alias_not_found_exception` when a `must_exist` remove names an alias
///   the index does not carry
/// - `remove_index_not_a_concrete_index` when a `remove_index` names an alias
/// - `index_not_found_exception` when an action names a missing index
pub async fn update_aliases<S: DocumentStore>(
    store: &S,
    actions: &[AliasAction],
    timeout: Option<Duration>,
) -> Result<(), ActionError> {
    if actions.is_empty() {
        return Ok(());
    }
    let timeout = resolve_timeout(timeout);
    tracing::debug!(actions = actions.len(), "update aliases");
    let ack = bounded(timeout, store.update_aliases(actions, timeout))
        .await
        .map_err(|e| to_action_error(e, |e| map_alias_error(e, actions)))?;
    require_ack(ack, "update aliases", first_index(actions))
}

fn map_alias_error(err: &StoreError, actions: &[AliasAction]) -> Option<ActionError> {
    match err.error_type()? {
        es::ALIASES_NOT_FOUND => Some(ActionError::AliasNotFound {
            reason: err.message(),
        }),
        es::ILLEGAL_ARGUMENT if err.reason().is_some_and(|r| r.contains("matches an alias")) => {
            let index = actions
                .iter()
                .find_map(|a| match a {
                    AliasAction::RemoveIndex { index } => Some(index.as_str()),
                    _ => None,
                })
                .unwrap_or_default();
            Some(ActionError::RemoveIndexNotAConcreteIndex {
                index: index.to_string(),
            })
        }
        _ => index_not_found(err, first_index(actions)),
    }
}

fn first_index(actions: &[AliasAction]) -> &str {
    actions.first().map(AliasAction::index).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use somigrate_store::{empty_mappings, InMemoryStore, MemIndex, StoreOp};

    fn store() -> InMemoryStore {
        InMemoryStore::new()
            .with_index("kibana_1", MemIndex::new(empty_mappings()).with_alias(".kibana"))
            .with_index("kibana_2", MemIndex::new(empty_mappings()))
    }

    fn swap() -> Vec<AliasAction> {
        vec![
            AliasAction::remove("kibana_1", ".kibana"),
            AliasAction::add("kibana_2", ".kibana"),
        ]
    }

    #[tokio::test]
    async fn swap_moves_the_alias() {
        let store = store();
        update_aliases(&store, &swap(), None).await.unwrap();
        assert_eq!(store.alias_targets(".kibana"), vec!["kibana_2".to_string()]);
    }

    #[tokio::test]
    async fn replayed_swap_is_alias_not_found_and_changes_nothing() {
        let store = store();
        update_aliases(&store, &swap(), None).await.unwrap();
        let err = update_aliases(&store, &swap(), None).await.unwrap_err();
        assert_eq!(err.tag(), "alias_not_found_exception");
        assert!(!err.is_retryable());
        assert_eq!(store.alias_targets(".kibana"), vec!["kibana_2".to_string()]);
    }

    #[tokio::test]
    async fn add_only_batch_is_idempotent() {
        let store = store();
        let actions = [AliasAction::add("kibana_2", ".kibana_8.8.0")];
        update_aliases(&store, &actions, None).await.unwrap();
        update_aliases(&store, &actions, None).await.unwrap();
        assert_eq!(store.alias_targets(".kibana_8.8.0"), vec!["kibana_2".to_string()]);
    }

    #[tokio::test]
    async fn removing_an_alias_as_an_index_is_tagged() {
        let store = store();
        let actions = [AliasAction::RemoveIndex {
            index: ".kibana".into(),
        }];
        let err = update_aliases(&store, &actions, None).await.unwrap_err();
        assert_eq!(
            err,
            ActionError::RemoveIndexNotAConcreteIndex {
                index: ".kibana".into()
            }
        );
    }

    #[tokio::test]
    async fn missing_index_is_index_not_found() {
        let store = store();
        let actions = [AliasAction::add("kibana_9", ".kibana")];
        let err = update_aliases(&store, &actions, None).await.unwrap_err();
        assert_eq!(
            err,
            ActionError::IndexNotFound {
                index: "kibana_9".into()
            }
        );
    }

    #[tokio::test]
    async fn empty_batch_makes_no_call() {
        let store = store();
        update_aliases(&store, &[], None).await.unwrap();
        assert_eq!(store.calls(StoreOp::UpdateAliases), 0);
    }
}
