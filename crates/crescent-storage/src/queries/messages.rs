// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message CRUD operations.

use rusqlite::params;

use crescent_core::CrescentError;
use crescent_core::types::timestamp;

use crate::database::{Database, map_tr_err};
use crate::models::{Message, message_from_row};

pub(crate) fn insert_message_row(
    conn: &rusqlite::Connection,
    msg: &Message,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO messages (id, conversation_id, role, content, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            msg.id,
            msg.conversation_id,
            msg.role.as_str(),
            msg.content,
            timestamp::format(&msg.created_at),
        ],
    )?;
    Ok(())
}

/// Insert a message if its conversation exists.
///
/// The parent check and the insert share one transaction. Returns `false`
/// (and writes nothing) when the conversation is missing.
pub async fn insert_message(db: &Database, msg: &Message) -> Result<bool, CrescentError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let parent_exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM conversations WHERE id = ?1)",
                params![msg.conversation_id],
                |row| row.get(0),
            )?;
            if !parent_exists {
                return Ok(false);
            }
            insert_message_row(&tx, &msg)?;
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(map_tr_err)
}

/// Get messages for a conversation in chronological order.
///
/// Equal timestamps keep insertion order.
pub async fn get_messages_for_conversation(
    db: &Database,
    conversation_id: &str,
) -> Result<Vec<Message>, CrescentError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, role, content, created_at
                 FROM messages WHERE conversation_id = ?1
                 ORDER BY created_at ASC, rowid ASC",
            )?;
            let rows = stmt.query_map(params![conversation_id], message_from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Delete one message. Returns whether a row was removed.
pub async fn delete_message(db: &Database, id: &str) -> Result<bool, CrescentError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let removed = conn.execute("DELETE FROM messages WHERE id = ?1", params![id])?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}
