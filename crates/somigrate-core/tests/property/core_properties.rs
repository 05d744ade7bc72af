use proptest::prelude::*;
use somigrate_core::config::MigrationConfig;
use somigrate_core::errors::ActionError;

fn action_error() -> impl Strategy<Value = ActionError> {
    let name = "[a-z0-9_.]{1,16}";
    prop_oneof![
        (".{0,30}", proptest::option::of(100u16..600))
            .prop_map(|(message, status)| ActionError::RetryableEsClientError { message, status }),
        name.prop_map(|index| ActionError::IndexNotFound { index }),
        name.prop_map(|index| ActionError::SourceEqualsTarget { index }),
        ".{0,30}".prop_map(|reason| ActionError::AliasNotFound { reason }),
        name.prop_map(|index| ActionError::RemoveIndexNotAConcreteIndex { index }),
        (name, ".{0,30}").prop_map(|(index, message)| ActionError::IndexNotGreenTimeout { index, message }),
        (name, ".{0,30}").prop_map(|(index, message)| ActionError::IndexNotYellowTimeout { index, message }),
        name.prop_map(|version_alias| ActionError::MigrationInProgress { version_alias }),
        (name, 0u64..1000, 0u64..1000).prop_map(|(target, source_count, target_count)| {
            ActionError::IndexContentMismatch {
                source_index: "kibana_1".into(),
                target,
                source_count,
                target_count,
                document_id: "config:1".into(),
            }
        }),
        (proptest::option::of(400u16..600), ".{0,30}").prop_map(|(status, reason)| {
            ActionError::RequestFailed { status, error_type: None, reason }
        }),
    ]
}

proptest! {
    #[test]
    fn tag_matches_serialized_type(err in action_error()) {
        let json = serde_json::to_value(&err).unwrap();
        prop_assert_eq!(json["type"].as_str(), Some(err.tag()));
    }

    #[test]
    fn valid_configs_roundtrip_through_toml(
        timeout_secs in 1u64..600,
        batch_size in 1usize..10_000,
        max_retries in 0u32..50,
        base_delay_ms in 1u64..10_000,
        extra_delay_ms in 0u64..100_000,
    ) {
        let mut config = MigrationConfig::default();
        config.actions.timeout_secs = timeout_secs;
        config.actions.batch_size = batch_size;
        config.retry.max_retries = max_retries;
        config.retry.base_delay_ms = base_delay_ms;
        config.retry.max_delay_ms = base_delay_ms + extra_delay_ms;

        let text = toml::to_string(&config).unwrap();
        let parsed = MigrationConfig::from_toml(&text).unwrap();
        prop_assert_eq!(parsed.actions.timeout_secs, timeout_secs);
        prop_assert_eq!(parsed.actions.batch_size, batch_size);
        prop_assert_eq!(parsed.retry.max_retries, max_retries);
        prop_assert_eq!(parsed.retry.max_delay_ms, base_delay_ms + extra_delay_ms);
    }
}
