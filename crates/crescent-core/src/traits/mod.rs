// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Every backend extends the [`PluginAdapter`] base trait and uses
//! `#[async_trait]` so adapters can also be held as trait objects.

pub mod adapter;
pub mod settings;
pub mod storage;

pub use adapter::PluginAdapter;
pub use settings::SettingsStore;
pub use storage::StorageAdapter;
