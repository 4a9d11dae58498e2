use deployiq_core::config::*;
use deployiq_core::errors::{ConfigError, DeployErrorCode};

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = DeployIqConfig::from_toml("").unwrap();

    // Storage defaults
    assert_eq!(config.storage.db_path, "deployiq.db");
    assert_eq!(config.storage.read_pool_size, 4);

    // Analyzer defaults
    assert_eq!(config.analyzer.sample_size, 50);
    assert_eq!(config.analyzer.asset_size_threshold_bytes, 1_048_576);
    assert_eq!(config.analyzer.dependency_count_threshold, 100);

    // Memory defaults
    assert_eq!(config.memory.min_rank_effectiveness, 6.0);
    assert_eq!(config.memory.insight_top_n, 10);
    assert_eq!(config.memory.top_solution_min_applied, 3);
    assert_eq!(config.memory.top_solution_min_success_rate, 0.7);

    // Resolver defaults
    assert_eq!(config.resolver.effectiveness_weight, 0.4);
    assert_eq!(config.resolver.success_rate_weight, 3.0);
    assert_eq!(config.resolver.recency_weight, 2.0);
    assert_eq!(config.resolver.automation_safe_bonus, 1.0);
    assert_eq!(config.resolver.recency_window_days, 30.0);
    assert_eq!(config.resolver.many_cases_threshold, 5);
    assert_eq!(config.resolver.many_cases_bonus, 0.2);
    assert_eq!(config.resolver.some_cases_threshold, 2);
    assert_eq!(config.resolver.some_cases_bonus, 0.1);
    assert_eq!(config.resolver.confidence_cap, 0.95);

    // Monitor defaults
    assert_eq!(config.monitor.auto_apply_confidence_threshold, 0.8);
    assert_eq!(config.monitor.store_retry.max_attempts, 3);

    // Observability defaults
    assert_eq!(config.observability.log_level, "info");
    assert!(!config.observability.json_logs);
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
[analyzer]
sample_size = 10
extra_skip_dirs = ["generated"]

[monitor]
auto_apply_confidence_threshold = 0.9
"#;
    let config = DeployIqConfig::from_toml(toml).unwrap();
    assert_eq!(config.analyzer.sample_size, 10);
    assert_eq!(config.monitor.auto_apply_confidence_threshold, 0.9);
    // Non-overridden fields keep defaults
    assert_eq!(config.analyzer.max_scan_depth, 12);
    assert_eq!(config.monitor.store_retry.backoff_ms, 50);
    assert!(config
        .analyzer
        .scan_limits()
        .skip_dirs
        .iter()
        .any(|d| d == "generated"));
}

#[test]
fn config_rejects_out_of_range_threshold() {
    let err = DeployIqConfig::from_toml("[monitor]\nauto_apply_confidence_threshold = 1.5\n")
        .unwrap_err();
    match err {
        ConfigError::ValidationFailed { field, .. } => {
            assert_eq!(field, "monitor.auto_apply_confidence_threshold")
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn config_rejects_negative_weight() {
    let err = DeployIqConfig::from_toml("[resolver]\nrecency_weight = -1.0\n").unwrap_err();
    assert_eq!(err.error_code(), "CONFIG_ERROR");
}

#[test]
fn config_reports_parse_errors() {
    let err = DeployIqConfig::from_toml("[storage\n").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn project_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("deployiq.toml"),
        "[memory]\ninsight_top_n = 5\n[storage]\ndb_path = \"/tmp/x.db\"\n",
    )
    .unwrap();
    let config = DeployIqConfig::load(dir.path()).unwrap();
    assert_eq!(config.memory.insight_top_n, 5);
    assert_eq!(config.memory.min_rank_effectiveness, 6.0);
}

#[test]
fn env_overrides_take_priority() {
    let mut config = DeployIqConfig::default();
    config
        .apply_env_overrides(|key| match key {
            "DEPLOYIQ_AUTO_APPLY_CONFIDENCE" => Some("0.85".to_string()),
            "DEPLOYIQ_DB_PATH" => Some("override.db".to_string()),
            _ => None,
        })
        .unwrap();
    assert_eq!(config.monitor.auto_apply_confidence_threshold, 0.85);
    assert_eq!(config.storage.db_path, "override.db");
}

#[test]
fn env_override_with_garbage_is_rejected() {
    let mut config = DeployIqConfig::default();
    let err = config
        .apply_env_overrides(|key| (key == "DEPLOYIQ_SAMPLE_SIZE").then(|| "many".to_string()))
        .unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { .. }));
}

#[test]
fn missing_store_has_its_own_code() {
    let err = ConfigError::MissingStore {
        component: "BuildMonitor".to_string(),
    };
    assert_eq!(err.coded_string(), "[MISSING_STORE] required service handle missing: BuildMonitor");
}
