//! Integration tests for configuration validation

#![allow(clippy::expect_used, clippy::unwrap_used)]

use rock_wire::config::{
    LoggingConfig, ProtocolConfig, RockConfig, DEFAULT_GZIP_THRESHOLD, DEFAULT_MAX_PROTOCOL_LENGTH,
};
use tracing::Level;

#[test]
fn test_default_config_validates() {
    let config = RockConfig::default();
    let errors = config.validate();
    assert!(
        errors.is_empty(),
        "Default config should be valid, but got errors: {:?}",
        errors
    );
    assert_eq!(config.protocol.max_protocol_length, 64 * 1024 * 1024);
    assert_eq!(config.protocol.gzip_threshold, 4 * 1024);
}

#[test]
fn test_zero_max_protocol_length() {
    let mut config = RockConfig::default();
    config.protocol.max_protocol_length = 0;

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("cannot be 0")));
}

#[test]
fn test_max_protocol_length_beyond_i32() {
    let mut config = RockConfig::default();
    config.protocol.max_protocol_length = u32::MAX;

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("too large")));
}

#[test]
fn test_zero_gzip_threshold() {
    let config = RockConfig::default_with_overrides(|c| c.protocol.gzip_threshold = 0);
    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Gzip threshold")));
}

#[test]
fn test_buffer_base_size_bounds() {
    let mut protocol = ProtocolConfig {
        buffer_base_size: 0,
        ..ProtocolConfig::default()
    };
    assert!(!protocol.validate().is_empty());

    protocol.buffer_base_size = 32 * 1024 * 1024;
    assert!(protocol
        .validate()
        .iter()
        .any(|e| e.contains("Buffer base size too large")));
}

#[test]
fn test_empty_app_name() {
    let logging = LoggingConfig {
        app_name: String::new(),
        ..LoggingConfig::default()
    };
    assert!(logging
        .validate()
        .iter()
        .any(|e| e.contains("cannot be empty")));
}

#[test]
fn test_multiple_errors_collected() {
    let mut config = RockConfig::default();
    config.protocol.max_protocol_length = 0;
    config.protocol.gzip_threshold = 0;
    config.logging.app_name = "x".repeat(100);

    assert_eq!(config.validate().len(), 3);
    let err = config.validate_strict().unwrap_err().to_string();
    assert!(err.contains("Configuration validation failed"));
}

#[test]
fn test_toml_partial_sections() {
    let config = RockConfig::from_toml(
        r#"
        [protocol]
        max_protocol_length = 1024
        gzip_threshold = 128

        [logging]
        app_name = "edge"
        log_level = "debug"
        json_format = true
        "#,
    )
    .expect("valid toml");

    assert_eq!(config.protocol.max_protocol_length, 1024);
    assert_eq!(config.protocol.gzip_threshold, 128);
    assert_eq!(config.protocol.buffer_base_size, 4096);
    assert_eq!(config.logging.log_level, Level::DEBUG);
    assert!(config.logging.json_format);
    assert!(config.validate_strict().is_ok());
}

#[test]
fn test_toml_missing_sections_use_defaults() {
    let config = RockConfig::from_toml("").expect("empty toml");
    assert_eq!(config.protocol.max_protocol_length, DEFAULT_MAX_PROTOCOL_LENGTH);
    assert_eq!(config.protocol.gzip_threshold, DEFAULT_GZIP_THRESHOLD);
}

#[test]
fn test_invalid_log_level_rejected() {
    let result = RockConfig::from_toml(
        r#"
        [logging]
        app_name = "x"
        log_level = "loud"
        json_format = false
        "#,
    );
    assert!(result.is_err());
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("rock.toml");

    let config = RockConfig::default_with_overrides(|c| {
        c.protocol.gzip_threshold = 512;
        c.logging.log_level = Level::WARN;
    });
    config.save_to_file(&path).unwrap();

    let loaded = RockConfig::from_file(&path).unwrap();
    assert_eq!(loaded.protocol.gzip_threshold, 512);
    assert_eq!(loaded.logging.log_level, Level::WARN);
}

#[test]
fn test_example_config_parses() {
    let example = RockConfig::example_config();
    assert!(example.contains("max_protocol_length"));
    assert!(RockConfig::from_toml(&example).is_ok());
}

#[test]
fn test_env_overrides() {
    std::env::set_var("ROCK_WIRE_GZIP_THRESHOLD", "2048");
    std::env::set_var("ROCK_WIRE_LOG_LEVEL", "trace");
    let config = RockConfig::from_env().unwrap();
    std::env::remove_var("ROCK_WIRE_GZIP_THRESHOLD");
    std::env::remove_var("ROCK_WIRE_LOG_LEVEL");

    assert_eq!(config.protocol.gzip_threshold, 2048);
    assert_eq!(config.logging.log_level, Level::TRACE);
}
