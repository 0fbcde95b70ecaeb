// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the configuration system.

use crescent_config::diagnostic::ConfigError;
use crescent_config::model::CrescentConfig;
use crescent_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};
use crescent_core::BackendKind;

#[test]
fn valid_toml_deserializes_into_crescent_config() {
    let toml = r#"
[app]
log_level = "debug"

[storage]
backend = "embedded"
database_path = "/tmp/test.db"
embedded_path = "/tmp/test-store.json"
wal_mode = false

[server]
host = "0.0.0.0"
port = 8080
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.app.log_level, "debug");
    assert_eq!(config.storage.backend, BackendKind::Embedded);
    assert_eq!(config.storage.database_path, "/tmp/test.db");
    assert_eq!(config.storage.embedded_path, "/tmp/test-store.json");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
}

#[test]
fn empty_toml_yields_defaults() {
    let config = load_config_from_str("").expect("empty TOML uses defaults");
    let defaults = CrescentConfig::default();
    assert_eq!(config.storage.backend, BackendKind::Relational);
    assert_eq!(config.storage.database_path, defaults.storage.database_path);
    assert_eq!(config.server.port, 3000);
    assert!(config.storage.wal_mode);
}

#[test]
fn unknown_backend_is_rejected() {
    let err = load_config_from_str("[storage]\nbackend = \"mongodb\"\n")
        .expect_err("unknown backend should fail");
    assert!(err.to_string().contains("mongodb") || err.to_string().contains("variant"));
}

#[test]
fn unknown_key_produces_suggestion() {
    let errors = load_and_validate_str("[storage]\nbackedn = \"embedded\"\n")
        .expect_err("unknown key should fail");
    let suggestion = errors.iter().find_map(|e| match e {
        ConfigError::UnknownKey { key, suggestion, .. } if key == "backedn" => suggestion.clone(),
        _ => None,
    });
    assert_eq!(suggestion.as_deref(), Some("backend"));
}

#[test]
fn invalid_type_is_reported() {
    let errors = load_and_validate_str("[server]\nport = \"eighty\"\n")
        .expect_err("string port should fail");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("port")))
    );
}

#[test]
fn validation_runs_after_deserialization() {
    let errors = load_and_validate_str("[app]\nlog_level = \"chatty\"\n")
        .expect_err("bad log level should fail");
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

#[test]
fn env_overrides_file_values() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "custom.toml",
            r#"
[storage]
backend = "relational"
database_path = "/tmp/from-file.db"
"#,
        )?;
        jail.set_env("CRESCENT_STORAGE_BACKEND", "embedded");
        jail.set_env("CRESCENT_SERVER_PORT", "4242");

        let config = load_and_validate_path(std::path::Path::new("custom.toml"))
            .expect("config should load");
        assert_eq!(config.storage.backend, BackendKind::Embedded);
        assert_eq!(config.storage.database_path, "/tmp/from-file.db");
        assert_eq!(config.server.port, 4242);
        Ok(())
    });
}
