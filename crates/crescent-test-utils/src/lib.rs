// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for crescent integration tests.
//!
//! # Components
//!
//! - [`conformance`] - Behavioral checks every `StorageAdapter` must pass
//! - [`FailingStorage`] - Adapter whose every operation fails with a storage error

pub mod conformance;
pub mod mock_storage;

pub use conformance::{run_settings_suite, run_storage_suite};
pub use mock_storage::FailingStorage;
