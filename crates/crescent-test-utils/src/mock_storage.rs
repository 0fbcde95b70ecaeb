// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter that fails every call.
//!
//! Used to exercise error paths of adapter consumers (HTTP status mapping,
//! CLI error reporting) without corrupting a real store.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crescent_core::{
    BackendKind, Conversation, ConversationOrder, ConversationPatch, CrescentError,
    EndpointSettings, HealthStatus, Message, NewConversation, NewMessage, PluginAdapter,
    SettingsStore, StorageAdapter,
};

/// A storage adapter whose driver is permanently broken.
pub struct FailingStorage {
    reason: String,
    calls: AtomicUsize,
}

impl FailingStorage {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of storage operations attempted so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> Result<T, CrescentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CrescentError::storage(std::io::Error::other(self.reason.clone())))
    }
}

impl Default for FailingStorage {
    fn default() -> Self {
        Self::new("storage driver unavailable")
    }
}

#[async_trait]
impl PluginAdapter for FailingStorage {
    fn name(&self) -> &str {
        "failing"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Relational
    }

    async fn health_check(&self) -> Result<HealthStatus, CrescentError> {
        Ok(HealthStatus::Unhealthy(self.reason.clone()))
    }

    async fn shutdown(&self) -> Result<(), CrescentError> {
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for FailingStorage {
    async fn initialize(&self) -> Result<(), CrescentError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), CrescentError> {
        Ok(())
    }

    async fn create_conversation(&self, _: NewConversation) -> Result<Conversation, CrescentError> {
        self.fail()
    }

    async fn start_conversation(
        &self,
        _: NewConversation,
        _: String,
    ) -> Result<(Conversation, Message), CrescentError> {
        self.fail()
    }

    async fn get_conversation(&self, _: &str) -> Result<Option<Conversation>, CrescentError> {
        self.fail()
    }

    async fn list_conversations(
        &self,
        _: ConversationOrder,
    ) -> Result<Vec<Conversation>, CrescentError> {
        self.fail()
    }

    async fn update_conversation(
        &self,
        _: &str,
        _: ConversationPatch,
    ) -> Result<Conversation, CrescentError> {
        self.fail()
    }

    async fn delete_conversation(&self, _: &str) -> Result<(), CrescentError> {
        self.fail()
    }

    async fn delete_all_conversations(&self) -> Result<u64, CrescentError> {
        self.fail()
    }

    async fn create_message(&self, _: NewMessage) -> Result<Message, CrescentError> {
        self.fail()
    }

    async fn get_messages(&self, _: &str) -> Result<Vec<Message>, CrescentError> {
        self.fail()
    }

    async fn delete_message(&self, _: &str) -> Result<(), CrescentError> {
        self.fail()
    }
}

#[async_trait]
impl SettingsStore for FailingStorage {
    async fn get_custom_endpoint(&self) -> Result<EndpointSettings, CrescentError> {
        self.fail()
    }

    async fn set_custom_endpoint(
        &self,
        _: Option<String>,
        _: Option<String>,
    ) -> Result<(), CrescentError> {
        self.fail()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_operation_fails_and_is_counted() {
        let storage = FailingStorage::new("disk on fire");
        let err = storage.get_conversation("x").await.unwrap_err();
        assert_eq!(err.to_string(), "storage error: disk on fire");
        let message = NewMessage::new("c", crescent_core::Role::User, "hi");
        assert!(storage.create_message(message).await.is_err());
        assert!(storage.start_conversation(NewConversation::new("t"), "hi".into()).await.is_err());
        assert!(storage.get_custom_endpoint().await.is_err());
        assert_eq!(storage.calls(), 4);
    }

    #[tokio::test]
    async fn health_reports_unhealthy() {
        let storage = FailingStorage::default();
        assert!(matches!(storage.health_check().await.unwrap(), HealthStatus::Unhealthy(_)));
    }
}
