// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait that all storage backends implement.

use async_trait::async_trait;

use crate::error::CrescentError;
use crate::types::{BackendKind, HealthStatus};

/// Identity, health, and shutdown for a backend.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Which persistence technology this adapter wraps.
    fn kind(&self) -> BackendKind;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, CrescentError>;

    /// Gracefully shuts down the adapter, flushing anything buffered.
    async fn shutdown(&self) -> Result<(), CrescentError>;
}
