// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The persistence contract for conversations and messages.

use async_trait::async_trait;

use crate::error::CrescentError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    Conversation, ConversationOrder, ConversationPatch, Message, NewConversation, NewMessage,
};

/// Persistence backend for conversation history.
///
/// Implementations own the stored representation; callers receive snapshots.
/// Reads of absent records return `None` or an empty vector rather than an
/// error, and deletes of absent records succeed without effect.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Opens the backend and brings its schema up to date.
    async fn initialize(&self) -> Result<(), CrescentError>;

    /// Flushes pending writes and releases the storage handle.
    async fn close(&self) -> Result<(), CrescentError>;

    // --- Conversations ---

    /// Stores a new conversation under a freshly generated identifier.
    async fn create_conversation(
        &self,
        conversation: NewConversation,
    ) -> Result<Conversation, CrescentError>;

    /// Stores a new conversation together with its first user message.
    ///
    /// Both records are written or neither is.
    async fn start_conversation(
        &self,
        conversation: NewConversation,
        first_message: String,
    ) -> Result<(Conversation, Message), CrescentError>;

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, CrescentError>;

    /// Lists every conversation, newest first by the requested timestamp.
    /// Equal timestamps are ordered by insertion, newest first.
    async fn list_conversations(
        &self,
        order: ConversationOrder,
    ) -> Result<Vec<Conversation>, CrescentError>;

    /// Merges `patch` onto the stored conversation and refreshes `updated_at`.
    ///
    /// Fails with [`CrescentError::NotFound`] if `id` does not exist.
    async fn update_conversation(
        &self,
        id: &str,
        patch: ConversationPatch,
    ) -> Result<Conversation, CrescentError>;

    /// Removes the conversation and all of its messages atomically.
    async fn delete_conversation(&self, id: &str) -> Result<(), CrescentError>;

    /// Removes every conversation and message atomically, returning the
    /// number of conversations removed.
    async fn delete_all_conversations(&self) -> Result<u64, CrescentError>;

    // --- Messages ---

    /// Stores a new message. The owning conversation must already exist.
    async fn create_message(&self, message: NewMessage) -> Result<Message, CrescentError>;

    /// Messages of a conversation in ascending creation order.
    async fn get_messages(&self, conversation_id: &str) -> Result<Vec<Message>, CrescentError>;

    async fn delete_message(&self, id: &str) -> Result<(), CrescentError>;
}
