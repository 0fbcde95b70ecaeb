// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use crescent_core::BackendKind;
use serde::{Deserialize, Serialize};

/// Top-level crescent configuration.
///
/// Every section is optional and defaults to values suitable for a
/// single-user local install.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CrescentConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub app: AppConfig,

    /// Persistence backend selection and paths.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Local HTTP API settings.
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Which backend to wire at startup.
    #[serde(default)]
    pub backend: BackendKind,

    /// Path to the SQLite database file (relational backend).
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Path to the object store file (embedded backend).
    #[serde(default = "default_embedded_path")]
    pub embedded_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            database_path: default_database_path(),
            embedded_path: default_embedded_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn data_file(name: &str) -> String {
    dirs::data_dir()
        .map(|p| p.join("crescent").join(name))
        .unwrap_or_else(|| std::path::PathBuf::from(name))
        .to_string_lossy()
        .into_owned()
}

fn default_database_path() -> String {
    data_file("crescent.db")
}

fn default_embedded_path() -> String {
    data_file("crescent-store.json")
}

fn default_wal_mode() -> bool {
    true
}

/// Local HTTP API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}
