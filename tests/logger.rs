//! Integration tests for logger behavior.

use quarter_planner::config::LoggingConfig;
use quarter_planner::logger::{apply_logging_config, set_level, set_level_from_str, Level};
use logger::{debug, error, info, warn};

#[test]
fn level_parse_accepts_valid() {
    assert!(set_level_from_str("error"));
    assert!(set_level_from_str("warn"));
    assert!(set_level_from_str("info"));
    assert!(set_level_from_str("debug"));
}

#[test]
fn level_parse_rejects_invalid() {
    assert!(!set_level_from_str("invalid"));
    assert!(!set_level_from_str(""));
}

#[test]
fn logs_do_not_panic() {
    set_level(Level::Debug);
    info!("info integration");
    warn!(target: "scheduler", "warn integration");
    error!("error integration");
    debug!(target: "search", "debug integration");
}

#[test]
fn logging_config_sets_level() {
    let config = LoggingConfig {
        level: "error".to_string(),
        file: String::new(),
        verbose: false,
    };
    assert_eq!(apply_logging_config(&config), Level::Error);

    let unknown = LoggingConfig {
        level: "chatty".to_string(),
        ..LoggingConfig::default()
    };
    assert_eq!(apply_logging_config(&unknown), Level::Warn);
}
