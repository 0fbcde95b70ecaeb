// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Behavioral checks shared by every storage backend.
//!
//! Each check takes an initialized adapter and panics on the first violated
//! expectation. Checks that inspect the full conversation list start by
//! clearing the store, so the suite can run against one adapter instance.

use std::collections::HashSet;

use chrono::{DateTime, TimeZone, Utc};

use crescent_core::{
    ConversationOrder, ConversationPatch, CrescentError, EndpointSettings, NewConversation,
    NewMessage, Role, SettingsStore, StorageAdapter,
};

/// A fixed point in the past, `offset_secs` after 2025-01-01T00:00:00Z.
pub fn at(offset_secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::seconds(offset_secs)
}

/// A conversation stamped at a fixed past instant.
pub fn conversation_at(title: &str, offset_secs: i64) -> NewConversation {
    NewConversation {
        title: title.to_string(),
        created_at: at(offset_secs),
        updated_at: at(offset_secs),
    }
}

/// A message stamped at a fixed past instant.
pub fn message_at(
    conversation_id: &str,
    role: Role,
    content: &str,
    offset_secs: i64,
) -> NewMessage {
    NewMessage {
        content: content.to_string(),
        role,
        conversation_id: conversation_id.to_string(),
        created_at: at(offset_secs),
    }
}

pub async fn create_assigns_unique_ids<S: StorageAdapter + ?Sized>(storage: &S) {
    let mut seen = HashSet::new();
    for i in 0..20 {
        let conv = storage
            .create_conversation(NewConversation::new(format!("chat {i}")))
            .await
            .unwrap();
        assert!(!conv.id.is_empty());
        assert!(seen.insert(conv.id), "duplicate conversation id");
    }
}

pub async fn get_returns_created_record<S: StorageAdapter + ?Sized>(storage: &S) {
    let created = storage
        .create_conversation(NewConversation::from_first_message("  what phase is the moon in?  "))
        .await
        .unwrap();
    assert_eq!(created.title, "what phase is the moon in?");
    let fetched = storage.get_conversation(&created.id).await.unwrap();
    assert_eq!(fetched, Some(created));
}

pub async fn get_missing_is_none<S: StorageAdapter + ?Sized>(storage: &S) {
    assert_eq!(storage.get_conversation("no-such-conversation").await.unwrap(), None);
    assert!(storage.get_messages("no-such-conversation").await.unwrap().is_empty());
}

pub async fn messages_come_back_in_creation_order<S: StorageAdapter + ?Sized>(storage: &S) {
    let conv = storage.create_conversation(conversation_at("ordering", 0)).await.unwrap();
    let m1 = storage
        .create_message(message_at(&conv.id, Role::User, "hello", 1))
        .await
        .unwrap();
    let m2 = storage
        .create_message(message_at(&conv.id, Role::Assistant, "hi there", 2))
        .await
        .unwrap();
    assert_eq!(storage.get_messages(&conv.id).await.unwrap(), vec![m1.clone(), m2.clone()]);

    // A message stamped earlier than everything so far sorts first even
    // though it was written last.
    let m0 = storage
        .create_message(message_at(&conv.id, Role::User, "earliest", -10))
        .await
        .unwrap();
    assert_eq!(storage.get_messages(&conv.id).await.unwrap(), vec![m0, m1, m2]);
}

pub async fn equal_timestamps_keep_insertion_order<S: StorageAdapter + ?Sized>(storage: &S) {
    let conv = storage.create_conversation(conversation_at("ties", 0)).await.unwrap();
    let mut expected = Vec::new();
    for content in ["a", "b", "c", "d"] {
        expected.push(
            storage
                .create_message(message_at(&conv.id, Role::User, content, 5))
                .await
                .unwrap(),
        );
    }
    assert_eq!(storage.get_messages(&conv.id).await.unwrap(), expected);
}

pub async fn messages_are_scoped_to_their_conversation<S: StorageAdapter + ?Sized>(storage: &S) {
    let a = storage.create_conversation(conversation_at("a", 0)).await.unwrap();
    let b = storage.create_conversation(conversation_at("b", 0)).await.unwrap();
    storage.create_message(message_at(&a.id, Role::User, "for a", 1)).await.unwrap();
    storage.create_message(message_at(&b.id, Role::User, "for b", 1)).await.unwrap();

    let a_msgs = storage.get_messages(&a.id).await.unwrap();
    assert_eq!(a_msgs.len(), 1);
    assert_eq!(a_msgs[0].content, "for a");
    assert_eq!(a_msgs[0].conversation_id, a.id);
}

pub async fn delete_conversation_cascades<S: StorageAdapter + ?Sized>(storage: &S) {
    let conv = storage.create_conversation(conversation_at("doomed", 0)).await.unwrap();
    let keep = storage.create_conversation(conversation_at("survivor", 0)).await.unwrap();
    for i in 0..3 {
        storage
            .create_message(message_at(&conv.id, Role::User, &format!("m{i}"), i))
            .await
            .unwrap();
    }
    storage.create_message(message_at(&keep.id, Role::User, "stay", 0)).await.unwrap();

    storage.delete_conversation(&conv.id).await.unwrap();
    assert_eq!(storage.get_conversation(&conv.id).await.unwrap(), None);
    assert!(storage.get_messages(&conv.id).await.unwrap().is_empty());

    assert!(storage.get_conversation(&keep.id).await.unwrap().is_some());
    assert_eq!(storage.get_messages(&keep.id).await.unwrap().len(), 1);
}

pub async fn delete_missing_conversation_is_noop<S: StorageAdapter + ?Sized>(storage: &S) {
    storage.delete_conversation("never-existed").await.unwrap();

    let conv = storage.create_conversation(conversation_at("twice", 0)).await.unwrap();
    storage.delete_conversation(&conv.id).await.unwrap();
    storage.delete_conversation(&conv.id).await.unwrap();
}

pub async fn update_changes_only_title_and_updated_at<S: StorageAdapter + ?Sized>(storage: &S) {
    let before = storage.create_conversation(conversation_at("before", 0)).await.unwrap();
    let after = storage
        .update_conversation(&before.id, ConversationPatch::title("X"))
        .await
        .unwrap();

    assert_eq!(after.id, before.id);
    assert_eq!(after.title, "X");
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at > before.updated_at);
    assert_eq!(storage.get_conversation(&before.id).await.unwrap(), Some(after.clone()));

    // Same patch again: same title, timestamp still never goes backwards.
    let again = storage
        .update_conversation(&before.id, ConversationPatch::title("X"))
        .await
        .unwrap();
    assert_eq!(again.title, "X");
    assert!(again.updated_at >= after.updated_at);
}

pub async fn empty_patch_still_touches<S: StorageAdapter + ?Sized>(storage: &S) {
    let before = storage.create_conversation(conversation_at("touch", 0)).await.unwrap();
    let after = storage
        .update_conversation(&before.id, ConversationPatch::default())
        .await
        .unwrap();
    assert_eq!(after.title, "touch");
    assert!(after.updated_at > before.updated_at);
}

pub async fn update_missing_is_not_found<S: StorageAdapter + ?Sized>(storage: &S) {
    let err = storage
        .update_conversation("ghost", ConversationPatch::title("X"))
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "expected NotFound, got {err}");
    assert_eq!(storage.get_conversation("ghost").await.unwrap(), None);
}

pub async fn list_orders_by_creation<S: StorageAdapter + ?Sized>(storage: &S) {
    storage.delete_all_conversations().await.unwrap();
    let c1 = storage.create_conversation(conversation_at("c1", 0)).await.unwrap();
    let c2 = storage.create_conversation(conversation_at("c2", 60)).await.unwrap();

    let listed = storage.list_conversations(ConversationOrder::CreatedDesc).await.unwrap();
    let ids: Vec<&str> = listed.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec![c2.id.as_str(), c1.id.as_str()]);

    // Touching c1 does not move it in the creation ordering.
    storage.update_conversation(&c1.id, ConversationPatch::title("c1!")).await.unwrap();
    let listed = storage.list_conversations(ConversationOrder::CreatedDesc).await.unwrap();
    assert_eq!(listed[0].id, c2.id);
}

pub async fn list_orders_by_update<S: StorageAdapter + ?Sized>(storage: &S) {
    storage.delete_all_conversations().await.unwrap();
    let c1 = storage.create_conversation(conversation_at("c1", 0)).await.unwrap();
    let c2 = storage.create_conversation(conversation_at("c2", 60)).await.unwrap();

    let listed = storage.list_conversations(ConversationOrder::UpdatedDesc).await.unwrap();
    assert_eq!(listed[0].id, c2.id);

    storage.update_conversation(&c1.id, ConversationPatch::title("bumped")).await.unwrap();
    let listed = storage.list_conversations(ConversationOrder::UpdatedDesc).await.unwrap();
    let ids: Vec<&str> = listed.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec![c1.id.as_str(), c2.id.as_str()]);
}

pub async fn list_ties_prefer_newer_insert<S: StorageAdapter + ?Sized>(storage: &S) {
    storage.delete_all_conversations().await.unwrap();
    let first = storage.create_conversation(conversation_at("first", 30)).await.unwrap();
    let second = storage.create_conversation(conversation_at("second", 30)).await.unwrap();
    for order in [ConversationOrder::CreatedDesc, ConversationOrder::UpdatedDesc] {
        let listed = storage.list_conversations(order).await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()], "order {order}");
    }
}

pub async fn delete_all_clears_everything<S: StorageAdapter + ?Sized>(storage: &S) {
    storage.delete_all_conversations().await.unwrap();
    let a = storage.create_conversation(conversation_at("a", 0)).await.unwrap();
    let b = storage.create_conversation(conversation_at("b", 1)).await.unwrap();
    storage.create_message(message_at(&a.id, Role::User, "x", 2)).await.unwrap();
    storage.create_message(message_at(&b.id, Role::Assistant, "y", 3)).await.unwrap();

    assert_eq!(storage.delete_all_conversations().await.unwrap(), 2);
    assert!(storage.list_conversations(ConversationOrder::CreatedDesc).await.unwrap().is_empty());
    assert!(storage.get_messages(&a.id).await.unwrap().is_empty());
    assert!(storage.get_messages(&b.id).await.unwrap().is_empty());

    assert_eq!(storage.delete_all_conversations().await.unwrap(), 0);
}

pub async fn create_message_requires_conversation<S: StorageAdapter + ?Sized>(storage: &S) {
    let err = storage
        .create_message(message_at("orphan-parent", Role::User, "lost", 0))
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "expected NotFound, got {err}");
    assert!(storage.get_messages("orphan-parent").await.unwrap().is_empty());
}

pub async fn delete_message_removes_only_that_message<S: StorageAdapter + ?Sized>(storage: &S) {
    let conv = storage.create_conversation(conversation_at("prune", 0)).await.unwrap();
    let m1 = storage.create_message(message_at(&conv.id, Role::User, "one", 1)).await.unwrap();
    let m2 = storage.create_message(message_at(&conv.id, Role::User, "two", 2)).await.unwrap();

    storage.delete_message(&m1.id).await.unwrap();
    assert_eq!(storage.get_messages(&conv.id).await.unwrap(), vec![m2]);
    storage.delete_message(&m1.id).await.unwrap();
    storage.delete_message("never-existed").await.unwrap();
}

pub async fn start_conversation_stores_both_records<S: StorageAdapter + ?Sized>(storage: &S) {
    let (conv, first) = storage
        .start_conversation(conversation_at("opening", 5), "  is it a full moon?  ".into())
        .await
        .unwrap();
    assert_eq!(first.conversation_id, conv.id);
    assert_eq!(first.role, Role::User);
    assert_eq!(first.content, "  is it a full moon?  ");
    assert_eq!(first.created_at, conv.created_at);
    assert_eq!(storage.get_conversation(&conv.id).await.unwrap(), Some(conv.clone()));
    assert_eq!(storage.get_messages(&conv.id).await.unwrap(), vec![first]);

    let before = storage.list_conversations(ConversationOrder::CreatedDesc).await.unwrap();
    let err = storage
        .start_conversation(NewConversation::new(" "), "ignored".into())
        .await
        .unwrap_err();
    assert!(matches!(err, CrescentError::Validation(_)));
    let after = storage.list_conversations(ConversationOrder::CreatedDesc).await.unwrap();
    assert_eq!(before, after);
}

pub async fn invalid_input_is_rejected<S: StorageAdapter + ?Sized>(storage: &S) {
    let blank = storage.create_conversation(NewConversation::new("   ")).await.unwrap_err();
    assert!(matches!(blank, CrescentError::Validation(_)));

    let long = storage
        .create_conversation(NewConversation::new("x".repeat(81)))
        .await
        .unwrap_err();
    assert!(matches!(long, CrescentError::Validation(_)));

    let mut backwards = conversation_at("time travel", 10);
    backwards.updated_at = at(0);
    let err = storage.create_conversation(backwards).await.unwrap_err();
    assert!(matches!(err, CrescentError::Validation(_)));

    // Five-digit years would break the fixed-width timestamp ordering.
    let mut far_future = conversation_at("far future", 0);
    far_future.created_at = Utc.with_ymd_and_hms(10_000, 1, 1, 0, 0, 0).unwrap();
    far_future.updated_at = far_future.created_at;
    let err = storage.create_conversation(far_future).await.unwrap_err();
    assert!(matches!(err, CrescentError::Validation(_)));

    let conv = storage.create_conversation(conversation_at("valid", 0)).await.unwrap();
    let mut far_message = message_at(&conv.id, Role::User, "late", 0);
    far_message.created_at = Utc.with_ymd_and_hms(12_345, 6, 7, 0, 0, 0).unwrap();
    let err = storage.create_message(far_message).await.unwrap_err();
    assert!(matches!(err, CrescentError::Validation(_)));

    let err = storage
        .update_conversation(&conv.id, ConversationPatch::title(""))
        .await
        .unwrap_err();
    assert!(matches!(err, CrescentError::Validation(_)));
    assert_eq!(storage.get_conversation(&conv.id).await.unwrap().unwrap().title, "valid");

    let err = storage
        .create_message(message_at("  ", Role::User, "hi", 0))
        .await
        .unwrap_err();
    assert!(matches!(err, CrescentError::Validation(_)));

    // Empty content is a legitimate (if unhelpful) assistant reply.
    storage
        .create_message(message_at(&conv.id, Role::Assistant, "", 1))
        .await
        .unwrap();
}

/// Runs every storage check against one initialized adapter.
pub async fn run_storage_suite<S: StorageAdapter + ?Sized>(storage: &S) {
    create_assigns_unique_ids(storage).await;
    get_returns_created_record(storage).await;
    get_missing_is_none(storage).await;
    messages_come_back_in_creation_order(storage).await;
    equal_timestamps_keep_insertion_order(storage).await;
    messages_are_scoped_to_their_conversation(storage).await;
    delete_conversation_cascades(storage).await;
    delete_missing_conversation_is_noop(storage).await;
    update_changes_only_title_and_updated_at(storage).await;
    empty_patch_still_touches(storage).await;
    update_missing_is_not_found(storage).await;
    list_orders_by_creation(storage).await;
    list_orders_by_update(storage).await;
    list_ties_prefer_newer_insert(storage).await;
    delete_all_clears_everything(storage).await;
    create_message_requires_conversation(storage).await;
    delete_message_removes_only_that_message(storage).await;
    start_conversation_stores_both_records(storage).await;
    invalid_input_is_rejected(storage).await;
}

/// Full-overwrite semantics of the endpoint settings record.
pub async fn run_settings_suite<S: SettingsStore + ?Sized>(settings: &S) {
    settings.set_custom_endpoint(None, None).await.unwrap();
    assert_eq!(settings.get_custom_endpoint().await.unwrap(), EndpointSettings::default());

    settings
        .set_custom_endpoint(Some("http://x".into()), Some("model-a".into()))
        .await
        .unwrap();
    assert_eq!(
        settings.get_custom_endpoint().await.unwrap(),
        EndpointSettings {
            endpoint: Some("http://x".into()),
            model_name: Some("model-a".into()),
        }
    );

    settings.set_custom_endpoint(None, Some("model-b".into())).await.unwrap();
    assert_eq!(
        settings.get_custom_endpoint().await.unwrap(),
        EndpointSettings {
            endpoint: None,
            model_name: Some("model-b".into()),
        }
    );
}
