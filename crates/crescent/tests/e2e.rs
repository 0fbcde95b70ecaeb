// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-level tests against both backends on disk.

use tempfile::TempDir;

use crescent::backend::Backend;
use crescent::cli::{ConversationsCommand, MessagesCommand, SettingsCommand};
use crescent::commands;
use crescent_config::model::StorageConfig;
use crescent_core::types::FALLBACK_TITLE;
use crescent_core::{BackendKind, ConversationOrder, NewConversation, Role};

fn storage_config(kind: BackendKind, dir: &TempDir) -> StorageConfig {
    StorageConfig {
        backend: kind,
        database_path: dir.path().join("chat.db").to_string_lossy().into_owned(),
        embedded_path: dir.path().join("chat-store.json").to_string_lossy().into_owned(),
        wal_mode: true,
    }
}

fn render(out: Vec<u8>) -> String {
    String::from_utf8(out).unwrap()
}

async fn seeded(kind: BackendKind, dir: &TempDir) -> (Backend, String) {
    let backend = Backend::open(&storage_config(kind, dir)).await.unwrap();
    let conversation = backend
        .storage()
        .create_conversation(NewConversation::from_first_message("What phase is the moon in?"))
        .await
        .unwrap();
    (backend, conversation.id)
}

#[tokio::test]
async fn add_then_show_on_both_backends() {
    for kind in [BackendKind::Embedded, BackendKind::Relational] {
        let dir = tempfile::tempdir().unwrap();
        let (backend, id) = seeded(kind, &dir).await;

        let mut out = Vec::new();
        commands::run_messages(
            &backend,
            MessagesCommand::Add {
                conversation_id: id.clone(),
                content: "Waxing crescent.".to_string(),
                role: Role::Assistant,
            },
            &mut out,
        )
        .await
        .unwrap();
        assert!(!render(out).trim().is_empty());

        let mut out = Vec::new();
        let show = ConversationsCommand::Show { id: id.clone(), json: false };
        commands::run_conversations(&backend, show, &mut out).await.unwrap();
        let text = render(out);
        assert!(text.starts_with("# What phase is the moon in?"), "{kind}: {text}");
        assert!(text.contains("assistant: Waxing crescent."));

        backend.shutdown().await.unwrap();
    }
}

#[tokio::test]
async fn new_starts_a_conversation_with_its_first_message() {
    for kind in [BackendKind::Embedded, BackendKind::Relational] {
        let dir = tempfile::tempdir().unwrap();
        let backend = Backend::open(&storage_config(kind, &dir)).await.unwrap();

        let mut out = Vec::new();
        let new = ConversationsCommand::New {
            content: "  When is the next full moon?  ".into(),
            json: false,
        };
        commands::run_conversations(&backend, new, &mut out).await.unwrap();
        let id = render(out).trim().to_string();

        let conversation = backend.storage().get_conversation(&id).await.unwrap().unwrap();
        assert_eq!(conversation.title, "When is the next full moon?", "{kind}");
        let messages = backend.storage().get_messages(&id).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "  When is the next full moon?  ");

        let mut out = Vec::new();
        let new = ConversationsCommand::New { content: "second".into(), json: true };
        commands::run_conversations(&backend, new, &mut out).await.unwrap();
        let detail: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(detail["conversation"]["title"], "second");
        assert_eq!(detail["messages"][0]["conversationId"], detail["conversation"]["id"]);

        let mut out = Vec::new();
        let blank = ConversationsCommand::New { content: "   ".into(), json: false };
        commands::run_conversations(&backend, blank, &mut out).await.unwrap();
        let blank_id = render(out).trim().to_string();
        let untitled = backend.storage().get_conversation(&blank_id).await.unwrap().unwrap();
        assert_eq!(untitled.title, FALLBACK_TITLE);

        let listed = backend.storage().list_conversations(ConversationOrder::CreatedDesc).await;
        assert_eq!(listed.unwrap().len(), 3, "{kind}");
        backend.shutdown().await.unwrap();
    }
}

#[tokio::test]
async fn list_json_and_delete() {
    let dir = tempfile::tempdir().unwrap();
    let (backend, id) = seeded(BackendKind::Relational, &dir).await;

    let mut out = Vec::new();
    commands::run_conversations(
        &backend,
        ConversationsCommand::List { order: ConversationOrder::UpdatedDesc, json: true },
        &mut out,
    )
    .await
    .unwrap();
    let listed: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(listed[0]["id"], id.as_str());
    assert_eq!(listed[0]["title"], "What phase is the moon in?");

    let mut out = Vec::new();
    let delete = ConversationsCommand::Delete { id: Some(id.clone()), all: false };
    commands::run_conversations(&backend, delete, &mut out).await.unwrap();
    assert_eq!(render(out), format!("deleted {id}\n"));

    let mut out = Vec::new();
    commands::run_conversations(
        &backend,
        ConversationsCommand::List { order: ConversationOrder::CreatedDesc, json: false },
        &mut out,
    )
    .await
    .unwrap();
    assert_eq!(render(out), "no conversations\n");

    backend.shutdown().await.unwrap();
}

#[tokio::test]
async fn delete_all_reports_count() {
    let dir = tempfile::tempdir().unwrap();
    let (backend, _) = seeded(BackendKind::Embedded, &dir).await;
    backend
        .storage()
        .create_conversation(NewConversation::new("second"))
        .await
        .unwrap();

    let mut out = Vec::new();
    let delete = ConversationsCommand::Delete { id: None, all: true };
    commands::run_conversations(&backend, delete, &mut out).await.unwrap();
    assert_eq!(render(out), "deleted 2 conversation(s)\n");
    backend.shutdown().await.unwrap();
}

#[tokio::test]
async fn show_missing_conversation_fails() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Backend::open(&storage_config(BackendKind::Embedded, &dir)).await.unwrap();

    let mut out = Vec::new();
    let show = ConversationsCommand::Show { id: "ghost".into(), json: true };
    let err = commands::run_conversations(&backend, show, &mut out).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(out.is_empty());
    backend.shutdown().await.unwrap();
}

#[tokio::test]
async fn settings_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = storage_config(BackendKind::Embedded, &dir);

    let backend = Backend::open(&config).await.unwrap();
    let mut out = Vec::new();
    commands::run_settings(
        &backend,
        SettingsCommand::SetEndpoint {
            endpoint: Some("http://localhost:8080/v1".into()),
            model: Some("model-a".into()),
        },
        &mut out,
    )
    .await
    .unwrap();
    backend.shutdown().await.unwrap();

    let reopened = Backend::open(&config).await.unwrap();
    let mut out = Vec::new();
    commands::run_settings(&reopened, SettingsCommand::Show, &mut out).await.unwrap();
    let text = render(out);
    assert!(text.contains("endpoint: http://localhost:8080/v1"));
    assert!(text.contains("model:    model-a"));
    reopened.shutdown().await.unwrap();
}

#[tokio::test]
async fn settings_need_the_embedded_backend() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Backend::open(&storage_config(BackendKind::Relational, &dir)).await.unwrap();
    let mut out = Vec::new();
    let err = commands::run_settings(&backend, SettingsCommand::Show, &mut out).await.unwrap_err();
    assert!(err.to_string().contains("sqlite"));
    backend.shutdown().await.unwrap();
}

#[test]
fn config_renders_as_toml() {
    let config = crescent_config::load_and_validate_str(
        "[storage]\nbackend = \"embedded\"\n\n[server]\nport = 4100\n",
    )
    .unwrap();
    let mut out = Vec::new();
    commands::run_config(&config, &mut out).unwrap();
    let text = render(out);
    assert!(text.contains("backend = \"embedded\""));
    assert!(text.contains("port = 4100"));
}
