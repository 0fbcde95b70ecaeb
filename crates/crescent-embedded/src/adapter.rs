// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded object store implementation of the StorageAdapter trait.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

use crescent_config::model::StorageConfig;
use crescent_core::types::timestamp;
use crescent_core::validation::{validate_new_conversation, validate_new_message, validate_patch};
use crescent_core::{
    BackendKind, Conversation, ConversationOrder, ConversationPatch, CrescentError,
    EndpointSettings, HealthStatus, Message, NewConversation, NewMessage, PluginAdapter,
    SettingsStore, StorageAdapter,
};

use crate::object_store::{ObjectStore, StoreError};
use crate::schema::{
    BY_CONVERSATION, BY_CREATED, BY_UPDATED, CONVERSATIONS, MESSAGES, SETTINGS, SETTINGS_KEY,
    STORE_VERSION, UPGRADE_STEPS,
};

/// Persisted shape of the settings singleton.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsRecord {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    custom_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model_name: Option<String>,
}

fn encode<T: Serialize>(record: &T) -> Result<Value, CrescentError> {
    serde_json::to_value(record).map_err(|e| StoreError::Json(e).into())
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, CrescentError> {
    serde_json::from_value(value).map_err(|e| StoreError::Json(e).into())
}

fn decode_all<T: DeserializeOwned>(values: Vec<Value>) -> Result<Vec<T>, CrescentError> {
    values.into_iter().map(decode).collect()
}

/// Object-store-backed storage adapter.
///
/// The store file is opened on [`StorageAdapter::initialize`]; until then
/// every operation fails. `None` as location keeps everything in memory.
pub struct EmbeddedStorage {
    location: Option<PathBuf>,
    store: OnceCell<ObjectStore>,
}

impl EmbeddedStorage {
    /// Adapter over the store file named by `storage.embedded_path`.
    pub fn new(config: &StorageConfig) -> Self {
        Self::at_path(&config.embedded_path)
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Some(path.into()),
            store: OnceCell::new(),
        }
    }

    /// Adapter whose data vanishes when it is dropped.
    pub fn in_memory() -> Self {
        Self {
            location: None,
            store: OnceCell::new(),
        }
    }

    fn store(&self) -> Result<&ObjectStore, CrescentError> {
        self.store.get().ok_or_else(|| {
            CrescentError::storage("embedded store not initialized -- call initialize() first")
        })
    }
}

#[async_trait]
impl PluginAdapter for EmbeddedStorage {
    fn name(&self) -> &str {
        "embedded"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Embedded
    }

    /// Degraded when the store file has vanished from under an open store;
    /// the data is still served from memory and the next write recreates it.
    async fn health_check(&self) -> Result<HealthStatus, CrescentError> {
        let store = self.store()?;
        let Some(path) = store.path() else {
            return Ok(HealthStatus::Healthy);
        };
        match tokio::fs::try_exists(path).await {
            Ok(true) => Ok(HealthStatus::Healthy),
            Ok(false) => Ok(HealthStatus::Degraded(format!(
                "store file {} is missing",
                path.display()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "store file {} is unreadable: {e}",
                path.display()
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), CrescentError> {
        if let Some(store) = self.store.get() {
            store.flush().await?;
            debug!("shutdown: embedded store flushed");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for EmbeddedStorage {
    async fn initialize(&self) -> Result<(), CrescentError> {
        let store = match &self.location {
            Some(path) => ObjectStore::open(path, STORE_VERSION, UPGRADE_STEPS).await?,
            None => ObjectStore::open_in_memory(STORE_VERSION, UPGRADE_STEPS).await?,
        };
        self.store
            .set(store)
            .map_err(|_| CrescentError::storage("embedded store already initialized"))?;
        debug!(path = ?self.location, "embedded storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), CrescentError> {
        self.store()?.flush().await?;
        debug!("embedded store flushed");
        Ok(())
    }

    // --- Conversation operations ---

    async fn create_conversation(
        &self,
        conversation: NewConversation,
    ) -> Result<Conversation, CrescentError> {
        validate_new_conversation(&conversation)?;
        let conversation = conversation.into_conversation(uuid::Uuid::new_v4().to_string());
        let value = encode(&conversation)?;
        self.store()?
            .write(|s| s.add(CONVERSATIONS, value).map_err(CrescentError::from))
            .await?;
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
        let (conversation_value, message_value) = (encode(&conversation)?, encode(&first)?);
        self.store()?
            .write(|s| {
                s.add(CONVERSATIONS, conversation_value)?;
                s.add(MESSAGES, message_value)?;
                Ok::<_, CrescentError>(())
            })
            .await?;
        debug!(id = %conversation.id, message_id = %first.id, "conversation started");
        Ok((conversation, first))
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, CrescentError> {
        let value = self
            .store()?
            .read(|s| s.get(CONVERSATIONS, id).map(|v| v.cloned()))
            .await?;
        value.map(decode).transpose()
    }

    async fn list_conversations(
        &self,
        order: ConversationOrder,
    ) -> Result<Vec<Conversation>, CrescentError> {
        let index = match order {
            ConversationOrder::CreatedDesc => BY_CREATED,
            ConversationOrder::UpdatedDesc => BY_UPDATED,
        };
        let mut values = self
            .store()?
            .read(|s| s.get_all_from_index(CONVERSATIONS, index, None))
            .await?;
        // Index scans ascend; newest first means walking them backwards.
        values.reverse();
        decode_all(values)
    }

    async fn update_conversation(
        &self,
        id: &str,
        patch: ConversationPatch,
    ) -> Result<Conversation, CrescentError> {
        validate_patch(&patch)?;
        let updated = self
            .store()?
            .write(|s| {
                let current: Conversation = match s.get(CONVERSATIONS, id)? {
                    Some(value) => decode(value.clone())?,
                    None => return Err(CrescentError::conversation_not_found(id)),
                };
                let merged = patch.apply(&current, timestamp::now());
                s.put(CONVERSATIONS, encode(&merged)?)?;
                Ok(merged)
            })
            .await?;
        debug!(id, "conversation updated");
        Ok(updated)
    }

    async fn delete_conversation(&self, id: &str) -> Result<(), CrescentError> {
        let (existed, messages) = self
            .store()?
            .write(|s| {
                let existed = s.delete(CONVERSATIONS, id)?;
                let messages = s.delete_by_index(MESSAGES, BY_CONVERSATION, id)?;
                Ok::<_, CrescentError>((existed, messages))
            })
            .await?;
        debug!(id, existed, messages, "conversation deleted");
        Ok(())
    }

    async fn delete_all_conversations(&self) -> Result<u64, CrescentError> {
        let (conversations, messages) = self
            .store()?
            .write(|s| Ok::<_, CrescentError>((s.clear(CONVERSATIONS)?, s.clear(MESSAGES)?)))
            .await?;
        debug!(conversations, messages, "all conversations deleted");
        Ok(conversations)
    }

    // --- Message operations ---

    async fn create_message(&self, message: NewMessage) -> Result<Message, CrescentError> {
        validate_new_message(&message)?;
        let message = message.into_message(uuid::Uuid::new_v4().to_string());
        let value = encode(&message)?;
        self.store()?
            .write(|s| {
                if s.get(CONVERSATIONS, &message.conversation_id)?.is_none() {
                    return Err(CrescentError::conversation_not_found(&message.conversation_id));
                }
                s.add(MESSAGES, value)?;
                Ok(())
            })
            .await?;
        debug!(id = %message.id, conversation_id = %message.conversation_id, "message created");
        Ok(message)
    }

    async fn get_messages(&self, conversation_id: &str) -> Result<Vec<Message>, CrescentError> {
        let values = self
            .store()?
            .read(|s| s.get_all_from_index(MESSAGES, BY_CONVERSATION, Some(conversation_id)))
            .await?;
        let mut messages: Vec<Message> = decode_all(values)?;
        // The owner index only groups; creation order comes from the timestamp.
        // The sort is stable, so equal timestamps keep insertion order.
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }

    async fn delete_message(&self, id: &str) -> Result<(), CrescentError> {
        let existed = self
            .store()?
            .write(|s| s.delete(MESSAGES, id).map_err(CrescentError::from))
            .await?;
        debug!(id, existed, "message deleted");
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for EmbeddedStorage {
    async fn get_custom_endpoint(&self) -> Result<EndpointSettings, CrescentError> {
        let value = self
            .store()?
            .read(|s| s.get(SETTINGS, SETTINGS_KEY).map(|v| v.cloned()))
            .await?;
        match value {
            Some(value) => {
                let record: SettingsRecord = decode(value)?;
                Ok(EndpointSettings {
                    endpoint: record.custom_endpoint,
                    model_name: record.model_name,
                })
            }
            None => Ok(EndpointSettings::default()),
        }
    }

    async fn set_custom_endpoint(
        &self,
        endpoint: Option<String>,
        model_name: Option<String>,
    ) -> Result<(), CrescentError> {
        let record = encode(&SettingsRecord {
            id: SETTINGS_KEY.to_string(),
            custom_endpoint: endpoint,
            model_name,
        })?;
        self.store()?
            .write(|s| s.put(SETTINGS, record).map_err(CrescentError::from))
            .await?;
        debug!("endpoint settings saved");
        Ok(())
    }
}
