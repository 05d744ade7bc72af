use somigrate_core::config::*;
use somigrate_core::errors::MigrateError;
use somigrate_core::models::MigrationStrategy;

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = MigrationConfig::from_toml("").unwrap();

    // Action defaults
    assert_eq!(config.actions.timeout_secs, 60);
    assert_eq!(config.actions.timeout(), defaults::DEFAULT_TIMEOUT);
    assert_eq!(config.actions.wait_for_status_timeout_secs, 30);
    assert_eq!(config.actions.batch_size, 1_000);

    // Retry defaults
    assert_eq!(config.retry.max_retries, 15);
    assert_eq!(config.retry.base_delay_ms, 1_000);
    assert_eq!(config.retry.max_delay_ms, 64_000);

    // Pipeline defaults
    assert!(!config.pipeline.wait_for_migration_completion);
    assert_eq!(config.pipeline.strategy, MigrationStrategy::Reindex);
    assert_eq!(config.pipeline.migration_poll_interval_ms, 2_000);
    assert_eq!(config.pipeline.migration_wait_timeout(), None);

    // Observability defaults
    assert_eq!(config.observability.log_level, "info");
    assert!(config.observability.json);
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
[retry]
max_retries = 3

[pipeline]
strategy = "clone"
"#;
    let config = MigrationConfig::from_toml(toml).unwrap();
    assert_eq!(config.retry.max_retries, 3);
    assert_eq!(config.pipeline.strategy, MigrationStrategy::Clone);
    // Non-overridden fields keep defaults
    assert_eq!(config.retry.base_delay_ms, 1_000);
    assert_eq!(config.actions.batch_size, 1_000);
}

#[test]
fn config_serde_roundtrip() {
    let config = MigrationConfig::default();
    let toml_str = toml::to_string(&config).unwrap();
    let roundtripped = MigrationConfig::from_toml(&toml_str).unwrap();
    assert_eq!(roundtripped.retry.max_retries, config.retry.max_retries);
    assert_eq!(roundtripped.actions.batch_size, config.actions.batch_size);
}

#[test]
fn zero_batch_size_is_rejected() {
    let err = MigrationConfig::from_toml("[actions]\nbatch_size = 0\n").unwrap_err();
    match err {
        MigrateError::Config(e) => assert!(e.to_string().contains("actions.batch_size")),
        other => panic!("Expected config error, got {other:?}"),
    }
}

#[test]
fn waiting_node_settings_load_and_validate() {
    let toml = "[pipeline]\nmigration_poll_interval_ms = 500\nmigration_wait_timeout_secs = 3600\n";
    let config = MigrationConfig::from_toml(toml).unwrap();
    assert_eq!(
        config.pipeline.migration_poll_interval(),
        std::time::Duration::from_millis(500)
    );
    assert_eq!(
        config.pipeline.migration_wait_timeout(),
        Some(std::time::Duration::from_secs(3600))
    );

    let err = MigrationConfig::from_toml("[pipeline]\nmigration_poll_interval_ms = 0\n").unwrap_err();
    assert!(err.to_string().contains("pipeline.migration_poll_interval_ms"));
}

#[test]
fn max_delay_below_base_is_rejected() {
    let toml = "[retry]\nbase_delay_ms = 5000\nmax_delay_ms = 100\n";
    assert!(MigrationConfig::from_toml(toml).is_err());
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = MigrationConfig::from_toml("[retry\nmax_retries = ").unwrap_err();
    assert!(err.to_string().contains("parse"));
}

#[test]
fn missing_file_reports_path() {
    let path = std::path::Path::new("/nonexistent/somigrate.toml");
    let err = MigrationConfig::from_file(path).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/somigrate.toml"));
}
