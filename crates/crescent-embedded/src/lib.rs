// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded persistence backend for crescent.
//!
//! Keeps conversations, messages, and endpoint settings in a versioned,
//! indexed object store that lives in a single JSON file next to the
//! client. Schema changes are additive upgrade steps replayed on open.

pub mod adapter;
pub mod object_store;
pub mod schema;

pub use adapter::EmbeddedStorage;
pub use object_store::{ObjectStore, StoreError};
