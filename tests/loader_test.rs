use maa_copilot::config::{Config, DEFAULT_API_BASE};
use maa_copilot::editor::history::DEFAULT_HISTORY_LIMIT;
use maa_copilot::maa::builder::OperationBuilder;
use maa_copilot::reconcile::loader::{
    load_editor_json, load_editor_operation, load_operation, save_operation,
};
use maa_copilot::reconcile::{ReconcileOptions, to_maa_operation};
use std::fs;

#[test]
fn test_save_and_reload_operation() {
    let operation = OperationBuilder::new("main_01-07")
        .version(3)
        .minimum_required("v4.0.0")
        .title("保存测试")
        .oper("能天使")
            .skill(3)
            .build()
        .deploy("能天使", [5, 3])
            .post_delay(500)
            .build()
        .build();

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("operation.json");
    save_operation(&operation, &file_path).expect("Failed to save operation");

    let loaded = load_operation(&file_path).expect("Failed to load operation");
    assert_eq!(loaded, operation);

    let editor = load_editor_operation(&file_path, &ReconcileOptions::default())
        .expect("Failed to load editor operation");
    assert_eq!(to_maa_operation(&editor), operation);

    let editor_path = temp_dir.path().join("editor.json");
    fs::write(&editor_path, serde_json::to_string(&editor.to_json().unwrap()).unwrap())
        .expect("Failed to write editor file");
    let reloaded = load_editor_json(&editor_path).expect("Failed to load editor json");
    assert_eq!(reloaded, editor);

    temp_dir.close().expect("Failed to close temp dir");
}

#[test]
fn test_load_errors_carry_context() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let missing = temp_dir.path().join("missing.json");
    let err = load_operation(&missing).unwrap_err();
    assert!(err.to_string().contains("Failed to read operation file"));

    let broken = temp_dir.path().join("broken.json");
    fs::write(&broken, "{ not json").expect("Failed to write temp file");
    let err = load_operation(&broken).unwrap_err();
    assert!(err.to_string().contains("Failed to parse operation"));
}

#[test]
fn test_load_config_from_yaml() {
    let yaml_content = r#"
default_post_delay: 1200
history_limit: 50
action_delays:
  attack: 2000
api:
  base_url: "https://example.test"
  siming_endpoint: "https://example.test/siming"
log_level: debug
"#;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("copilot.yaml");
    fs::write(&file_path, yaml_content).expect("Failed to write temp file");

    let config = Config::load(&file_path).expect("Failed to load config");
    assert_eq!(config.default_post_delay, 1200);
    assert_eq!(config.history_limit, 50);
    assert_eq!(config.action_delays.attack, 2000);
    assert_eq!(config.action_delays.ultimate, 5000);
    assert_eq!(config.api.siming_endpoint.as_deref(), Some("https://example.test/siming"));
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.reconcile_options().mapper.default_post_delay, 1200);

    assert!(Config::load(temp_dir.path().join("nope.yaml")).is_err());
}

#[test]
fn test_partial_config_keeps_defaults() {
    let config = Config::from_yaml_str(
        "default_post_delay: 800\naction_delays:\n  ultimate: 6000\napi:\n  timeout_secs: 5\n",
    )
    .unwrap();
    assert_eq!(config.default_post_delay, 800);
    assert_eq!(config.action_delays.ultimate, 6000);
    assert_eq!(config.action_delays.attack, 3000);
    assert_eq!(config.api.timeout_secs, 5);
    assert_eq!(config.api.base_url, DEFAULT_API_BASE);
    assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);
}
