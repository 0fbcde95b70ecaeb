// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for crescent.
//!
//! Provides the domain types, error taxonomy, validation rules, and the
//! adapter traits that both persistence backends implement.

pub mod error;
pub mod traits;
pub mod types;
pub mod validation;

pub use error::CrescentError;
pub use types::{
    derive_title, BackendKind, Conversation, ConversationOrder, ConversationPatch,
    EndpointSettings, HealthStatus, Message, NewConversation, NewMessage, Role,
};

pub use traits::{PluginAdapter, SettingsStore, StorageAdapter};
