// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collection layout and upgrade history of the embedded store.
//!
//! Each step is additive: it creates a collection or index only when absent.
//! New schema changes go at the end with the next version number; earlier
//! steps are never edited.

use crate::object_store::{StoreError, StoreState, UpgradeStep};

pub const STORE_VERSION: u32 = 4;

pub const CONVERSATIONS: &str = "conversations";
pub const MESSAGES: &str = "messages";
pub const SETTINGS: &str = "settings";

pub const BY_UPDATED: &str = "by-updated";
pub const BY_CREATED: &str = "by-created";
pub const BY_CONVERSATION: &str = "by-conversation";

/// Fixed key of the singleton endpoint settings record.
pub const SETTINGS_KEY: &str = "customEndpoint";

const KEY_PATH: &str = "id";

fn v1_conversations_and_messages(state: &mut StoreState) -> Result<(), StoreError> {
    state.create_collection(CONVERSATIONS, KEY_PATH);
    state.create_index(CONVERSATIONS, BY_UPDATED, "updatedAt")?;
    state.create_collection(MESSAGES, KEY_PATH);
    state.create_index(MESSAGES, BY_CONVERSATION, "conversationId")?;
    Ok(())
}

fn v2_conversations_by_created(state: &mut StoreState) -> Result<(), StoreError> {
    state.create_collection(CONVERSATIONS, KEY_PATH);
    state.create_index(CONVERSATIONS, BY_CREATED, "createdAt")?;
    Ok(())
}

fn v3_messages_by_created(state: &mut StoreState) -> Result<(), StoreError> {
    state.create_collection(MESSAGES, KEY_PATH);
    state.create_index(MESSAGES, BY_CREATED, "createdAt")?;
    Ok(())
}

fn v4_settings(state: &mut StoreState) -> Result<(), StoreError> {
    state.create_collection(SETTINGS, KEY_PATH);
    Ok(())
}

pub const UPGRADE_STEPS: &[UpgradeStep] = &[
    UpgradeStep {
        version: 1,
        description: "conversations by-updated, messages by-conversation",
        apply: v1_conversations_and_messages,
    },
    UpgradeStep {
        version: 2,
        description: "conversations by-created",
        apply: v2_conversations_by_created,
    },
    UpgradeStep {
        version: 3,
        description: "messages by-created",
        apply: v3_messages_by_created,
    },
    UpgradeStep {
        version: 4,
        description: "settings",
        apply: v4_settings,
    },
];
