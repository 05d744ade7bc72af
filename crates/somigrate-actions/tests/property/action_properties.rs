use proptest::prelude::*;
use somigrate_actions::classifier::{classify, to_action_error, Classified, RETRYABLE_STATUSES};
use somigrate_actions::{reindex, safe_write_block, ReindexParams, SafeWriteBlockParams};
use somigrate_core::errors::{StoreError, TransportErrorKind};
use somigrate_core::traits::IdentityTransform;
use somigrate_store::{empty_mappings, InMemoryStore, MemIndex, StoreOp};
use test_fixtures::saved_objects;

fn block_on<F: std::future::Future>(fut: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(fut)
}

fn error_type() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("snapshot_in_progress_exception".to_string()),
        Just("process_cluster_event_timeout_exception".to_string()),
        Just("cluster_block_exception".to_string()),
        Just("index_not_found_exception".to_string()),
        Just("illegal_argument_exception".to_string()),
        "[a-z_]{1,30}",
    ]
}

fn transport_kind() -> impl Strategy<Value = TransportErrorKind> {
    prop_oneof![
        Just(TransportErrorKind::ConnectionRefused),
        Just(TransportErrorKind::NoLivingConnections),
        Just(TransportErrorKind::Timeout),
    ]
}

proptest! {
    #[test]
    fn transport_errors_always_retry(kind in transport_kind(), message in ".{0,40}") {
        let classified = classify(StoreError::transport(kind, message));
        prop_assert!(matches!(classified, Classified::Retryable(_)));
    }

    #[test]
    fn classification_is_total_and_single_tagged(
        status in 100u16..600,
        error_type in error_type(),
        reason in ".{0,60}",
    ) {
        let err = StoreError::response(status, &error_type, reason.clone());
        let action = to_action_error(err.clone(), |_| None);
        match classify(err) {
            Classified::Retryable(e) => {
                prop_assert!(e.is_retryable());
                prop_assert_eq!(action.tag(), "retryable_es_client_error");
            }
            Classified::Other(_) => {
                prop_assert!(!action.is_retryable());
                prop_assert_eq!(action.tag(), "request_failed");
            }
        }
    }

    #[test]
    fn logic_errors_never_retry(
        status in prop_oneof![400u16..408, 409u16..429, 430u16..500],
        reason in "[a-z ]{0,40}",
    ) {
        let err = StoreError::response(status, "parse_exception", reason);
        prop_assert!(matches!(classify(err), Classified::Other(_)));
    }

    #[test]
    fn retryable_statuses_retry_whatever_the_body(
        idx in 0usize..RETRYABLE_STATUSES.len(),
        error_type in error_type(),
    ) {
        let err = StoreError::response(RETRYABLE_STATUSES[idx], &error_type, "x");
        prop_assert!(matches!(classify(err), Classified::Retryable(_)));
    }

    #[test]
    fn same_index_guard_never_reaches_the_store(index in "[a-z0-9_.]{1,20}") {
        let store = InMemoryStore::new().with_index(index.clone(), MemIndex::new(empty_mappings()));
        let params = SafeWriteBlockParams { source: &index, target: &index, timeout: None };
        let result = block_on(safe_write_block(&store, params));
        prop_assert_eq!(result.unwrap_err().tag(), "source_equals_target");
        prop_assert_eq!(store.calls(StoreOp::AddWriteBlock), 0);
    }

    #[test]
    fn reindex_replay_converges(docs in 0usize..40, batch_size in 1usize..12) {
        let store = InMemoryStore::new()
            .with_index(
                "kibana_1",
                MemIndex::new(empty_mappings()).with_documents(saved_objects("config", docs)),
            )
            .with_index("kibana_2", MemIndex::new(empty_mappings()));
        let params = || ReindexParams {
            source: "kibana_1",
            target: "kibana_2",
            transform: &IdentityTransform,
            batch_size,
            timeout: None,
        };

        let once = block_on(reindex(&store, params())).unwrap();
        let after_once = store.documents("kibana_2");
        let twice = block_on(reindex(&store, params())).unwrap();

        prop_assert_eq!(once.indexed, docs as u64);
        prop_assert_eq!(twice.read, once.read);
        prop_assert_eq!(twice.indexed, 0);
        prop_assert_eq!(twice.existing, docs as u64);
        prop_assert_eq!(store.documents("kibana_2"), after_once);
    }
}
