// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every crescent crate.

use thiserror::Error;

/// The primary error type returned by adapters and core helpers.
#[derive(Debug, Error)]
pub enum CrescentError {
    /// Configuration errors (invalid TOML, missing fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage driver errors (I/O, SQLite, serialization, quota).
    ///
    /// Driver failures are not distinguished further; callers log them and
    /// surface a generic failure.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The addressed record does not exist.
    #[error("{entity} `{id}` not found")]
    NotFound { entity: &'static str, id: String },

    /// Input rejected before reaching storage.
    #[error("validation error: {0}")]
    Validation(String),

    /// Adapter health check failed.
    #[error("health check failed for {name}: {source}")]
    HealthCheckFailed {
        name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CrescentError {
    /// Wrap any driver error as [`CrescentError::Storage`].
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        CrescentError::Storage {
            source: source.into(),
        }
    }

    /// Shorthand for a missing conversation.
    pub fn conversation_not_found(id: impl Into<String>) -> Self {
        CrescentError::NotFound {
            entity: "conversation",
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CrescentError::NotFound { .. })
    }
}
