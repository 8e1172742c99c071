//! Integration tests for configuration management

use quarter_planner::config::{Config, ConfigOverrides};
use quarter_planner::scheduler::DebtCarry;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to create a temporary config directory
fn setup_temp_config() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_file = temp_dir.path().join("nested").join("config.toml");
    (temp_dir, config_file)
}

#[test]
fn test_config_from_defaults() {
    let config = Config::from_defaults();

    assert!(
        !config.logging.level.is_empty(),
        "Default log level should not be empty"
    );
    assert!(
        !config.logging.file.contains("$QUARTER_PLANNER"),
        "Default log file should be expanded"
    );
    assert!(config.scheduler.unit_cap.is_some());
    assert!(config.scheduler.max_quarters.is_some());
}

#[test]
fn test_config_from_toml_basic() {
    let toml_str = r#"
[logging]
level = "info"
file = "/tmp/test.log"
verbose = true

[scheduler]
unit_cap = 12.0
max_quarters = 15
branch_factor = 2
max_candidates = 8
max_expansions = 5000
debt_carry = "rollover"
max_rollover = 4.0
"#;

    let config = Config::from_toml(toml_str).expect("Failed to parse TOML");

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.file, "/tmp/test.log");
    assert!(config.logging.verbose);
    assert_eq!(config.scheduler.unit_cap, Some(12.0));
    assert_eq!(config.scheduler.max_quarters, Some(15));
    assert_eq!(config.scheduler.max_expansions, Some(5000));

    let scheduler = config.scheduler_config().expect("valid scheduler section");
    assert_eq!(scheduler.branch_factor, 2);
    assert_eq!(scheduler.max_candidates, 8);
    assert_eq!(scheduler.max_expansions, Some(5000));
    assert_eq!(scheduler.debt_carry, DebtCarry::Rollover { max_rollover: 4.0 });
}

#[test]
fn test_config_from_toml_partial() {
    let toml_str = r#"
[logging]
level = "error"
"#;

    let config = Config::from_toml(toml_str).expect("Failed to parse partial TOML");

    assert_eq!(config.logging.level, "error");
    assert_eq!(config.logging.file, ""); // Default empty
    assert!(!config.logging.verbose); // Default false
    assert!(config.scheduler.unit_cap.is_none());
}

#[test]
fn test_config_variable_expansion() {
    let toml_str = r#"
[logging]
file = "$QUARTER_PLANNER/test.log"
"#;

    let config = Config::from_toml(toml_str).expect("Failed to parse TOML with variables");

    assert!(config.logging.file.contains("quarterplanner"));
    assert!(!config.logging.file.contains("$QUARTER_PLANNER"));
}

#[test]
fn test_config_get_set() {
    let mut config = Config::from_defaults();

    assert!(config.get("level").is_some());

    config.set("level", "debug").expect("Failed to set level");
    assert_eq!(config.get("level").unwrap(), "debug");

    config
        .set("verbose", "true")
        .expect("Failed to set verbose");
    assert_eq!(config.get("verbose").unwrap(), "true");
    assert!(config.logging.verbose);

    config
        .set("max-quarters", "12")
        .expect("Failed to set max_quarters");
    assert_eq!(config.get("max_quarters").unwrap(), "12");

    assert!(config.set("verbose", "maybe").is_err());
    assert!(config.set("debt_carry", "borrow").is_err());
    assert!(config.get("unknown_key").is_none());
    assert!(config.set("unknown_key", "value").is_err());
}

#[test]
fn test_config_unset() {
    let mut config = Config::from_defaults();
    let defaults = Config::from_defaults();

    config.set("level", "error").expect("Failed to set level");
    config.set("unit_cap", "9").expect("Failed to set unit_cap");

    config
        .unset("level", &defaults)
        .expect("Failed to unset level");
    config
        .unset("unit_cap", &defaults)
        .expect("Failed to unset unit_cap");
    assert_eq!(config.logging.level, defaults.logging.level);
    assert_eq!(config.scheduler.unit_cap, defaults.scheduler.unit_cap);
    assert!(config.unset("nope", &defaults).is_err());
}

#[test]
fn test_config_save_and_load() {
    let (_temp_dir, config_file) = setup_temp_config();

    let mut config = Config::from_defaults();
    config.set("level", "info").expect("Failed to set level");
    config.set("branch_factor", "5").expect("Failed to set branch_factor");

    config.save_to(&config_file).expect("Failed to save config");
    assert!(config_file.exists());

    let loaded = Config::load_from(&config_file).expect("Failed to load config");
    assert_eq!(loaded.logging.level, "info");
    assert_eq!(loaded.scheduler.branch_factor, Some(5));
    assert_eq!(loaded, config);
}

#[test]
fn test_load_from_rejects_bad_toml() {
    let (_temp_dir, config_file) = setup_temp_config();
    fs::create_dir_all(config_file.parent().expect("has parent")).expect("Failed to create dir");
    fs::write(&config_file, "[scheduler\nunit_cap = ").expect("Failed to write config");

    assert!(Config::load_from(&config_file).is_err());
}

#[test]
fn test_config_overrides_apply() {
    let mut config = Config::from_defaults();

    let overrides = ConfigOverrides {
        level: Some("error".to_string()),
        file: Some("/custom/path.log".to_string()),
        verbose: Some(true),
        unit_cap: Some(10.0),
        max_quarters: Some(9),
        max_expansions: Some(100),
    };

    config.apply_overrides(&overrides);

    assert_eq!(config.logging.level, "error");
    assert_eq!(config.logging.file, "/custom/path.log");
    assert!(config.logging.verbose);
    let scheduler = config.scheduler_config().expect("valid scheduler section");
    assert!((scheduler.unit_cap - 10.0).abs() < f32::EPSILON);
    assert_eq!(scheduler.max_quarters, 9);
    assert_eq!(scheduler.max_expansions, Some(100));
}

#[test]
fn test_config_overrides_partial() {
    let mut config = Config::from_defaults();
    let before = config.scheduler.clone();

    let overrides = ConfigOverrides {
        level: Some("debug".to_string()),
        ..ConfigOverrides::default()
    };

    config.apply_overrides(&overrides);

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.scheduler, before);
}

#[test]
fn test_config_display_format() {
    let config = Config::from_defaults();
    let display_str = format!("{config}");

    assert!(display_str.contains("[logging]"));
    assert!(display_str.contains("[scheduler]"));
    assert!(display_str.contains("level"));
    assert!(display_str.contains("unit_cap"));
    assert!(display_str.contains("debt_carry"));
}

#[test]
fn test_merge_defaults_adds_missing_fields() {
    let toml_str = r#"
[logging]
level = "error"
file = ""
verbose = false
"#;

    let mut config = Config::from_toml(toml_str).expect("Failed to parse minimal config");
    let defaults = Config::from_defaults();

    let changed = config.merge_defaults(&defaults);

    assert!(
        changed,
        "merge_defaults should return true when fields are added"
    );
    assert_eq!(config.scheduler.unit_cap, defaults.scheduler.unit_cap);
    assert!(!config.merge_defaults(&defaults));
}

#[test]
fn test_merge_defaults_preserves_existing() {
    let toml_str = r#"
[logging]
level = "error"
file = "/my/custom/path.log"
verbose = false

[scheduler]
unit_cap = 7.5
"#;

    let mut config = Config::from_toml(toml_str).expect("Failed to parse config");
    let defaults = Config::from_defaults();

    config.merge_defaults(&defaults);

    assert_eq!(config.logging.level, "error");
    assert_eq!(config.logging.file, "/my/custom/path.log");
    assert_eq!(config.scheduler.unit_cap, Some(7.5));
}

#[test]
fn test_get_planner_dir() {
    let dir = Config::get_planner_dir();
    assert!(dir.to_string_lossy().contains("quarterplanner"));
}

#[test]
fn test_get_config_file_path() {
    let path = Config::get_config_file_path();
    let path_str = path.to_string_lossy();
    assert!(path_str.ends_with("config.toml") || path_str.ends_with("dconfig.toml"));
}
