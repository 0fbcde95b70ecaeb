// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use crescent_config::model::StorageConfig;
use crescent_core::validation::{validate_new_conversation, validate_new_message, validate_patch};
use crescent_core::{
    BackendKind, Conversation, ConversationOrder, ConversationPatch, CrescentError, HealthStatus,
    Message, NewConversation, NewMessage, PluginAdapter, StorageAdapter,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is opened by
/// [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until `initialize` is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, CrescentError> {
        self.db.get().ok_or_else(|| {
            CrescentError::storage("storage not initialized -- call initialize() first")
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Relational
    }

    async fn health_check(&self) -> Result<HealthStatus, CrescentError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| conn.execute_batch("SELECT 1;"))
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CrescentError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), CrescentError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db
            .set(db)
            .map_err(|_| CrescentError::storage("storage already initialized"))?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), CrescentError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Conversation operations ---

    async fn create_conversation(
        &self,
        conversation: NewConversation,
    ) -> Result<Conversation, CrescentError> {
        validate_new_conversation(&conversation)?;
        let conversation = conversation.into_conversation(uuid::Uuid::new_v4().to_string());
        queries::conversations::create_conversation(self.db()?, &conversation).await?;
        debug!(id = %conversation.id, "conversation created");
        Ok(conversation)
    }

    async fn start_conversation(
        &self,
        conversation: NewConversation,
        first_message: String,
    ) -> Result<(Conversation, Message), CrescentError> {
        validate_new_conversation(&conversation)?;
        let id = uuid::Uuid::new_v4().to_string();
        let first = conversation.first_message(&id, first_message);
        validate_new_message(&first)?;
        let conversation = conversation.into_conversation(id);
        let first = first.into_message(uuid::Uuid::new_v4().to_string());
        queries::conversations::create_conversation_with_message(self.db()?, &conversation, &first)
            .await?;
        debug!(id = %conversation.id, message_id = %first.id, "conversation started");
        Ok((conversation, first))
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, CrescentError> {
        queries::conversations::get_conversation(self.db()?, id).await
    }

    async fn list_conversations(
        &self,
        order: ConversationOrder,
    ) -> Result<Vec<Conversation>, CrescentError> {
        queries::conversations::list_conversations(self.db()?, order).await
    }

    async fn update_conversation(
        &self,
        id: &str,
        patch: ConversationPatch,
    ) -> Result<Conversation, CrescentError> {
        validate_patch(&patch)?;
        let updated = queries::conversations::update_conversation(self.db()?, id, patch)
            .await?
            .ok_or_else(|| CrescentError::conversation_not_found(id))?;
        debug!(id, "conversation updated");
        Ok(updated)
    }

    async fn delete_conversation(&self, id: &str) -> Result<(), CrescentError> {
        let existed = queries::conversations::delete_conversation(self.db()?, id).await?;
        debug!(id, existed, "conversation deleted");
        Ok(())
    }

    async fn delete_all_conversations(&self) -> Result<u64, CrescentError> {
        let removed = queries::conversations::delete_all_conversations(self.db()?).await?;
        debug!(removed, "all conversations deleted");
        Ok(removed)
    }

    // --- Message operations ---

    async fn create_message(&self, message: NewMessage) -> Result<Message, CrescentError> {
        validate_new_message(&message)?;
        let message = message.into_message(uuid::Uuid::new_v4().to_string());
        if !queries::messages::insert_message(self.db()?, &message).await? {
            return Err(CrescentError::conversation_not_found(&message.conversation_id));
        }
        debug!(id = %message.id, conversation_id = %message.conversation_id, "message created");
        Ok(message)
    }

    async fn get_messages(&self, conversation_id: &str) -> Result<Vec<Message>, CrescentError> {
        queries::messages::get_messages_for_conversation(self.db()?, conversation_id).await
    }

    async fn delete_message(&self, id: &str) -> Result<(), CrescentError> {
        let existed = queries::messages::delete_message(self.db()?, id).await?;
        debug!(id, existed, "message deleted");
        Ok(())
    }
}
