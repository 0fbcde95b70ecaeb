// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Singleton store for the user's completion endpoint choice.

use async_trait::async_trait;

use crate::error::CrescentError;
use crate::types::EndpointSettings;

#[async_trait]
pub trait SettingsStore: Send + Sync + 'static {
    /// Returns the stored settings, or empty settings if none were saved.
    async fn get_custom_endpoint(&self) -> Result<EndpointSettings, CrescentError>;

    /// Overwrites both fields. `None` clears a field; nothing is merged.
    async fn set_custom_endpoint(
        &self,
        endpoint: Option<String>,
        model_name: Option<String>,
    ) -> Result<(), CrescentError>;
}
