use tempfile::TempDir;
use tex_pilot::config::{CONFIG_FILE_NAME, TexPilotConfig};
use tex_pilot::health::names;
use tex_pilot::notification::{Liveness, Priority, Role};

#[test]
fn test_default_config() {
    let config = TexPilotConfig::default();

    assert_eq!(config.scheduler.debounce_ms, 800);
    assert_eq!(config.scheduler.fast_debounce_ms, 100);
    assert_eq!(config.scheduler.max_wait_ms, 15_000);
    assert_eq!(config.scheduler.large_input_threshold, 1000);
    assert_eq!(config.scheduler.small_input_threshold, 100);

    assert!((config.complexity.max_complexity_score - 50.0).abs() < f64::EPSILON);
    assert_eq!(config.complexity.max_document_length, 10_000);
    assert_eq!(config.complexity.default_timeout_ms, 10_000);
    assert_eq!(config.complexity.max_estimated_time_ms, 15_000);

    assert_eq!(config.notifier.timeout_ms, 5000);
    assert_eq!(config.notifier.role, Role::Status);
    assert_eq!(config.notifier.liveness, Liveness::Polite);
    assert_eq!(config.notifier.priority, Priority::Normal);

    assert!(!config.recovery.chunk_on_timeout);
    assert!(config.engine.command.is_none());

    assert_eq!(config.health.required.len(), names::REQUIRED.len());
    assert_eq!(config.health.optional.len(), names::OPTIONAL.len());
}

#[tokio::test]
async fn test_partial_file_keeps_other_defaults() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"
[scheduler]
debounce_ms = 400

[notifier]
priority = "high"
prefix = "LaTeX"
"#,
    )
    .unwrap();

    let config = TexPilotConfig::load(dir.path()).await.unwrap();

    assert_eq!(config.scheduler.debounce_ms, 400);
    assert_eq!(config.scheduler.max_wait_ms, 15_000);
    assert_eq!(config.notifier.priority, Priority::High);
    assert_eq!(config.notifier.prefix.as_deref(), Some("LaTeX"));
    assert_eq!(config.notifier.timeout_ms, 5000);
}

#[tokio::test]
async fn test_invalid_file_is_rejected_on_load() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[scheduler]\ndebounce_ms = 900\nmax_wait_ms = 500\n",
    )
    .unwrap();

    let err = TexPilotConfig::load(dir.path()).await.unwrap_err();
    assert!(err.to_string().contains("max_wait_ms"));
}

#[tokio::test]
async fn test_malformed_toml_is_rejected() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[scheduler\n").unwrap();

    assert!(TexPilotConfig::load(dir.path()).await.is_err());
}

#[tokio::test]
async fn test_save_refuses_invalid_config() {
    let dir = TempDir::new().unwrap();
    let mut config = TexPilotConfig::default();
    config.recovery.baseline_args = "  ".to_string();

    assert!(config.save(dir.path()).await.is_err());
    assert!(!dir.path().join(CONFIG_FILE_NAME).exists());
}

#[tokio::test]
async fn test_custom_registry_lists_round_trip() {
    let dir = TempDir::new().unwrap();
    let mut config = TexPilotConfig::default();
    config.health.required = vec![names::STATE_MANAGER.to_string()];
    config.health.optional = vec![names::UTILITIES.to_string()];
    config.save(dir.path()).await.unwrap();

    let loaded = TexPilotConfig::load(dir.path()).await.unwrap();
    assert_eq!(loaded.health.required, vec![names::STATE_MANAGER]);
    assert_eq!(loaded.health.optional, vec![names::UTILITIES]);
}
