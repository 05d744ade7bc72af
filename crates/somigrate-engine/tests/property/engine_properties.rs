use std::time::Duration;

use proptest::prelude::*;
use somigrate_core::config::MigrationConfig;
use somigrate_core::errors::{StoreError, TransportErrorKind};
use somigrate_core::models::{ControlState, MigrationOutcome, MigrationPlan};
use somigrate_engine::{migrate, RetryPolicy};
use somigrate_store::StoreOp;
use test_fixtures::kibana_1_store;

fn block_on_paused<F: std::future::Future>(fut: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .unwrap()
        .block_on(fut)
}

fn failing_op() -> impl Strategy<Value = (StoreOp, ControlState)> {
    prop_oneof![
        Just((StoreOp::GetIndices, ControlState::Init)),
        Just((StoreOp::ClusterHealth, ControlState::WaitForYellowSource)),
        Just((StoreOp::AddWriteBlock, ControlState::SetSourceWriteBlock)),
        Just((StoreOp::CreateIndex, ControlState::CreateTargetIndex)),
        Just((StoreOp::BulkIndex, ControlState::Reindex)),
        Just((StoreOp::RemoveWriteBlock, ControlState::SetTargetWriteBlockOff)),
        Just((StoreOp::UpdateAliases, ControlState::UpdateAliases)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn retry_budget_is_exact_for_every_step(
        max_retries in 0u32..8,
        (op, state) in failing_op(),
    ) {
        let store = kibana_1_store();
        store.fail(op, StoreError::transport(TransportErrorKind::ConnectionRefused, "refused"));
        let mut config = MigrationConfig::default();
        config.retry.max_retries = max_retries;
        let plan = MigrationPlan::new(".kibana", ".kibana_8.8.0", "kibana_1", "kibana_2");

        let outcome = block_on_paused(migrate(&store, &plan, &config));

        match outcome {
            MigrationOutcome::Fatal { failed_state, error, .. } => {
                prop_assert_eq!(failed_state, state);
                prop_assert!(error.is_retryable());
            }
            MigrationOutcome::Done { .. } => prop_assert!(false, "expected FATAL"),
        }
        prop_assert_eq!(store.calls(op), max_retries as usize + 1);
    }

    #[test]
    fn transient_failures_within_budget_never_change_the_result(
        failures in 0usize..5,
        (op, _) in failing_op(),
    ) {
        let store = kibana_1_store();
        store.fail_times(op, StoreError::response(503, "unavailable", "busy"), failures);
        let plan = MigrationPlan::new(".kibana", ".kibana_8.8.0", "kibana_1", "kibana_2");

        let outcome = block_on_paused(migrate(&store, &plan, &MigrationConfig::default()));

        prop_assert!(outcome.is_done());
        prop_assert_eq!(store.documents("kibana_2").len(), 3);
        prop_assert_eq!(store.alias_targets(".kibana"), vec!["kibana_2".to_string()]);
    }

    #[test]
    fn delays_are_monotonic_and_capped(
        base_ms in 1u64..5_000,
        cap_factor in 1u64..100,
        retry_count in 0u32..64,
    ) {
        let policy = RetryPolicy {
            max_retries: 15,
            base_delay: Duration::from_millis(base_ms),
            max_delay: Duration::from_millis(base_ms * cap_factor),
        };
        prop_assert!(policy.delay(retry_count) <= policy.max_delay);
        prop_assert!(policy.delay(retry_count) <= policy.delay(retry_count + 1));
    }
}
