// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./crescent.toml` > `~/.config/crescent/crescent.toml`
//! > `/etc/crescent/crescent.toml` with environment variable overrides via the
//! `CRESCENT_` prefix.

// figment::Error is external and cannot be boxed without a wrapper.
#![allow(clippy::result_large_err)]

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::CrescentConfig;

pub(crate) const LOCAL_CONFIG: &str = "crescent.toml";
pub(crate) const SYSTEM_CONFIG: &str = "/etc/crescent/crescent.toml";

pub(crate) fn user_config_path() -> std::path::PathBuf {
    dirs::config_dir()
        .map(|d| d.join("crescent").join(LOCAL_CONFIG))
        .unwrap_or_default()
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/crescent/crescent.toml`
/// 3. `~/.config/crescent/crescent.toml`
/// 4. `./crescent.toml`
/// 5. `CRESCENT_*` environment variables
pub fn load_config() -> Result<CrescentConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<CrescentConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CrescentConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CrescentConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CrescentConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment used for hierarchical loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(CrescentConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Environment provider with explicit section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `CRESCENT_STORAGE_DATABASE_PATH` must map to
/// `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("CRESCENT_").map(|key| {
        key.as_str()
            .replacen("app_", "app.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("server_", "server.", 1)
            .into()
    })
}
