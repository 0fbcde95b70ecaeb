// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Startup selection of the persistence backend.
//!
//! The backend is chosen once from `storage.backend` and injected into
//! whatever consumes it; nothing switches backends per call.

use std::sync::Arc;

use tracing::{info, warn};

use crescent_config::model::StorageConfig;
use crescent_core::{
    BackendKind, CrescentError, HealthStatus, PluginAdapter, SettingsStore, StorageAdapter,
};
use crescent_embedded::EmbeddedStorage;
use crescent_storage::SqliteStorage;

/// The initialized adapter for this process.
#[derive(Clone)]
pub enum Backend {
    Embedded(Arc<EmbeddedStorage>),
    Relational(Arc<SqliteStorage>),
}

impl Backend {
    /// Build and initialize the configured backend, then health-check it.
    pub async fn open(config: &StorageConfig) -> Result<Self, CrescentError> {
        let backend = match config.backend {
            BackendKind::Embedded => {
                let storage = EmbeddedStorage::new(config);
                storage.initialize().await?;
                Self::Embedded(Arc::new(storage))
            }
            BackendKind::Relational => {
                let storage = SqliteStorage::new(config.clone());
                storage.initialize().await?;
                Self::Relational(Arc::new(storage))
            }
        };

        let storage = backend.storage();
        match storage.health_check().await? {
            HealthStatus::Healthy => {}
            HealthStatus::Degraded(why) => {
                warn!(backend = storage.name(), %why, "storage degraded")
            }
            HealthStatus::Unhealthy(why) => {
                return Err(CrescentError::HealthCheckFailed {
                    name: storage.name().to_string(),
                    source: why.into(),
                });
            }
        }
        info!(backend = storage.name(), kind = %storage.kind(), "storage ready");
        Ok(backend)
    }

    pub fn storage(&self) -> &dyn StorageAdapter {
        match self {
            Self::Embedded(s) => s.as_ref(),
            Self::Relational(s) => s.as_ref(),
        }
    }

    /// The endpoint settings store, if this backend keeps one.
    pub fn settings(&self) -> Option<&dyn SettingsStore> {
        match self {
            Self::Embedded(s) => Some(s.as_ref()),
            Self::Relational(_) => None,
        }
    }

    /// Flush and release the backend.
    pub async fn shutdown(&self) -> Result<(), CrescentError> {
        let storage = self.storage();
        storage.close().await?;
        storage.shutdown().await
    }
}
