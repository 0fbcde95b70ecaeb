// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offline management commands run directly against the configured backend.

use std::io::Write;

use crescent_config::CrescentConfig;
use crescent_core::types::timestamp;
use crescent_core::{Conversation, CrescentError, NewConversation, NewMessage};

use crate::backend::Backend;
use crate::cli::{ConversationsCommand, MessagesCommand, SettingsCommand};

fn io_err(e: std::io::Error) -> CrescentError {
    CrescentError::Internal(format!("failed to write output: {e}"))
}

fn json_err(e: serde_json::Error) -> CrescentError {
    CrescentError::Internal(format!("failed to encode output: {e}"))
}

fn write_conversation_line(out: &mut impl Write, c: &Conversation) -> Result<(), CrescentError> {
    writeln!(
        out,
        "{}  {}  {}  {}",
        c.id,
        timestamp::format(&c.created_at),
        timestamp::format(&c.updated_at),
        c.title
    )
    .map_err(io_err)
}

pub async fn run_conversations(
    backend: &Backend,
    command: ConversationsCommand,
    out: &mut impl Write,
) -> Result<(), CrescentError> {
    let storage = backend.storage();
    match command {
        ConversationsCommand::New { content, json } => {
            let (conversation, first) = storage
                .start_conversation(NewConversation::from_first_message(&content), content)
                .await?;
            if json {
                let value = serde_json::json!({
                    "conversation": conversation,
                    "messages": [first],
                });
                serde_json::to_writer_pretty(&mut *out, &value).map_err(json_err)?;
                writeln!(out).map_err(io_err)?;
            } else {
                writeln!(out, "{}", conversation.id).map_err(io_err)?;
            }
        }
        ConversationsCommand::List { order, json } => {
            let conversations = storage.list_conversations(order).await?;
            if json {
                serde_json::to_writer_pretty(&mut *out, &conversations).map_err(json_err)?;
                writeln!(out).map_err(io_err)?;
            } else if conversations.is_empty() {
                writeln!(out, "no conversations").map_err(io_err)?;
            } else {
                for c in &conversations {
                    write_conversation_line(out, c)?;
                }
            }
        }
        ConversationsCommand::Show { id, json } => {
            let conversation = storage
                .get_conversation(&id)
                .await?
                .ok_or_else(|| CrescentError::conversation_not_found(&id))?;
            let messages = storage.get_messages(&id).await?;
            if json {
                let value = serde_json::json!({
                    "conversation": conversation,
                    "messages": messages,
                });
                serde_json::to_writer_pretty(&mut *out, &value).map_err(json_err)?;
                writeln!(out).map_err(io_err)?;
            } else {
                writeln!(out, "# {}", conversation.title).map_err(io_err)?;
                for m in &messages {
                    let at = timestamp::format(&m.created_at);
                    writeln!(out, "[{at}] {}: {}", m.role, m.content).map_err(io_err)?;
                }
            }
        }
        ConversationsCommand::Delete { id, all } => {
            if all {
                let deleted = storage.delete_all_conversations().await?;
                writeln!(out, "deleted {deleted} conversation(s)").map_err(io_err)?;
            } else if let Some(id) = id {
                storage.delete_conversation(&id).await?;
                writeln!(out, "deleted {id}").map_err(io_err)?;
            }
        }
    }
    Ok(())
}

pub async fn run_messages(
    backend: &Backend,
    command: MessagesCommand,
    out: &mut impl Write,
) -> Result<(), CrescentError> {
    match command {
        MessagesCommand::Add {
            conversation_id,
            content,
            role,
        } => {
            let message = backend
                .storage()
                .create_message(NewMessage::new(conversation_id, role, content))
                .await?;
            writeln!(out, "{}", message.id).map_err(io_err)?;
        }
    }
    Ok(())
}

pub async fn run_settings(
    backend: &Backend,
    command: SettingsCommand,
    out: &mut impl Write,
) -> Result<(), CrescentError> {
    let settings = backend.settings().ok_or_else(|| {
        CrescentError::Config(format!(
            "the {} backend does not store endpoint settings",
            backend.storage().name()
        ))
    })?;
    match command {
        SettingsCommand::Show => {}
        SettingsCommand::SetEndpoint { endpoint, model } => {
            settings.set_custom_endpoint(endpoint, model).await?;
        }
    }
    let current = settings.get_custom_endpoint().await?;
    let endpoint = current.endpoint.as_deref().unwrap_or("(default)");
    let model = current.model_name.as_deref().unwrap_or("(default)");
    writeln!(out, "endpoint: {endpoint}").map_err(io_err)?;
    writeln!(out, "model:    {model}").map_err(io_err)?;
    Ok(())
}

/// Print the effective configuration.
pub fn run_config(config: &CrescentConfig, out: &mut impl Write) -> Result<(), CrescentError> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| CrescentError::Config(format!("failed to render configuration: {e}")))?;
    out.write_all(rendered.as_bytes()).map_err(io_err)
}

