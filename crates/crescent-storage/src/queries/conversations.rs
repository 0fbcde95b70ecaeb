// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation CRUD operations.

use rusqlite::{OptionalExtension, params};

use crescent_core::types::timestamp;
use crescent_core::{ConversationOrder, ConversationPatch, CrescentError};

use crate::database::{Database, map_tr_err};
use crate::models::{Conversation, Message, conversation_from_row};
use crate::queries::messages::insert_message_row;

const SELECT_CONVERSATION: &str = "SELECT id, title, created_at, updated_at FROM conversations";

fn read_conversation(
    conn: &rusqlite::Connection,
    id: &str,
) -> rusqlite::Result<Option<Conversation>> {
    conn.query_row(
        &format!("{SELECT_CONVERSATION} WHERE id = ?1"),
        params![id],
        conversation_from_row,
    )
    .optional()
}

fn insert_conversation(
    conn: &rusqlite::Connection,
    conversation: &Conversation,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO conversations (id, title, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            conversation.id,
            conversation.title,
            timestamp::format(&conversation.created_at),
            timestamp::format(&conversation.updated_at),
        ],
    )?;
    Ok(())
}

/// Insert a new conversation.
pub async fn create_conversation(
    db: &Database,
    conversation: &Conversation,
) -> Result<(), CrescentError> {
    let conversation = conversation.clone();
    db.connection()
        .call(move |conn| insert_conversation(conn, &conversation))
        .await
        .map_err(map_tr_err)
}

/// Insert a conversation and its first message in one transaction.
pub async fn create_conversation_with_message(
    db: &Database,
    conversation: &Conversation,
    first: &Message,
) -> Result<(), CrescentError> {
    let (conversation, first) = (conversation.clone(), first.clone());
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            insert_conversation(&tx, &conversation)?;
            insert_message_row(&tx, &first)?;
            tx.commit()
        })
        .await
        .map_err(map_tr_err)
}

/// Get a conversation by ID.
pub async fn get_conversation(
    db: &Database,
    id: &str,
) -> Result<Option<Conversation>, CrescentError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| read_conversation(conn, &id))
        .await
        .map_err(map_tr_err)
}

/// List every conversation, newest first by the requested timestamp.
///
/// Equal timestamps fall back to insertion order, newest insert first.
pub async fn list_conversations(
    db: &Database,
    order: ConversationOrder,
) -> Result<Vec<Conversation>, CrescentError> {
    let column = match order {
        ConversationOrder::CreatedDesc => "created_at",
        ConversationOrder::UpdatedDesc => "updated_at",
    };
    let sql = format!("{SELECT_CONVERSATION} ORDER BY {column} DESC, rowid DESC");
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], conversation_from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Merge `patch` onto the stored conversation in one transaction.
///
/// Returns `None` when no conversation has this ID.
pub async fn update_conversation(
    db: &Database,
    id: &str,
    patch: ConversationPatch,
) -> Result<Option<Conversation>, CrescentError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let Some(current) = read_conversation(&tx, &id)? else {
                return Ok(None);
            };
            let merged = patch.apply(&current, timestamp::now());
            tx.execute(
                "UPDATE conversations SET title = ?1, updated_at = ?2 WHERE id = ?3",
                params![merged.title, timestamp::format(&merged.updated_at), merged.id],
            )?;
            tx.commit()?;
            Ok(Some(merged))
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a conversation; its messages go with it via `ON DELETE CASCADE`.
///
/// Returns whether a row was removed.
pub async fn delete_conversation(db: &Database, id: &str) -> Result<bool, CrescentError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let removed = conn.execute("DELETE FROM conversations WHERE id = ?1", params![id])?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete every conversation (and, by cascade, every message).
pub async fn delete_all_conversations(db: &Database) -> Result<u64, CrescentError> {
    db.connection()
        .call(|conn| {
            let removed = conn.execute("DELETE FROM conversations", [])?;
            Ok(removed as u64)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn make_conversation(
        id: &str,
        title: &str,
        created_secs: u32,
        updated_secs: u32,
    ) -> Conversation {
        Conversation {
            id: id.to_string(),
            title: title.to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, created_secs).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, updated_secs).unwrap(),
        }
    }

    #[tokio::test]
    async fn create_and_get_conversation() {
        let db = Database::open_in_memory().await.unwrap();
        let conv = make_conversation("c1", "first", 0, 0);
        create_conversation(&db, &conv).await.unwrap();

        assert_eq!(get_conversation(&db, "c1").await.unwrap(), Some(conv));
        assert_eq!(get_conversation(&db, "nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let db = Database::open_in_memory().await.unwrap();
        let conv = make_conversation("c1", "first", 0, 0);
        create_conversation(&db, &conv).await.unwrap();
        assert!(create_conversation(&db, &conv).await.is_err());
    }

    #[tokio::test]
    async fn list_orders_by_requested_column() {
        let db = Database::open_in_memory().await.unwrap();
        create_conversation(&db, &make_conversation("old", "old", 1, 9)).await.unwrap();
        create_conversation(&db, &make_conversation("new", "new", 5, 5)).await.unwrap();

        let by_created = list_conversations(&db, ConversationOrder::CreatedDesc).await.unwrap();
        assert_eq!(by_created[0].id, "new");
        let by_updated = list_conversations(&db, ConversationOrder::UpdatedDesc).await.unwrap();
        assert_eq!(by_updated[0].id, "old");
    }

    #[tokio::test]
    async fn update_merges_in_transaction() {
        let db = Database::open_in_memory().await.unwrap();
        create_conversation(&db, &make_conversation("c1", "before", 0, 0)).await.unwrap();

        let updated = update_conversation(&db, "c1", ConversationPatch::title("after"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "after");
        assert_eq!(get_conversation(&db, "c1").await.unwrap(), Some(updated));

        let missing = update_conversation(&db, "ghost", ConversationPatch::title("x"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn delete_reports_whether_row_existed() {
        let db = Database::open_in_memory().await.unwrap();
        create_conversation(&db, &make_conversation("c1", "t", 0, 0)).await.unwrap();
        assert!(delete_conversation(&db, "c1").await.unwrap());
        assert!(!delete_conversation(&db, "c1").await.unwrap());
    }

    #[tokio::test]
    async fn conversation_with_first_message_commits_together() {
        use crate::models::Role;
        use crate::queries::messages::get_messages_for_conversation;

        let db = Database::open_in_memory().await.unwrap();
        let conv = make_conversation("c1", "hello", 0, 0);
        let first = Message {
            id: "m1".to_string(),
            content: "hello".to_string(),
            role: Role::User,
            conversation_id: "c1".to_string(),
            created_at: conv.created_at,
        };
        create_conversation_with_message(&db, &conv, &first).await.unwrap();
        assert_eq!(get_conversation(&db, "c1").await.unwrap(), Some(conv));
        assert_eq!(get_messages_for_conversation(&db, "c1").await.unwrap(), vec![first]);
    }

    #[tokio::test]
    async fn failed_first_message_rolls_back_conversation() {
        use crate::models::Role;

        let db = Database::open_in_memory().await.unwrap();
        db.connection()
            .call(|conn| {
                conn.execute_batch(
                    "CREATE TRIGGER reject_messages BEFORE INSERT ON messages
                     BEGIN SELECT RAISE(ABORT, 'quota exceeded'); END;",
                )
            })
            .await
            .unwrap();

        let conv = make_conversation("c1", "hello", 0, 0);
        let first = Message {
            id: "m1".to_string(),
            content: "hello".to_string(),
            role: Role::User,
            conversation_id: "c1".to_string(),
            created_at: conv.created_at,
        };
        assert!(create_conversation_with_message(&db, &conv, &first).await.is_err());
        assert_eq!(get_conversation(&db, "c1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_all_counts_rows() {
        let db = Database::open_in_memory().await.unwrap();
        for id in ["a", "b", "c"] {
            create_conversation(&db, &make_conversation(id, id, 0, 0)).await.unwrap();
        }
        assert_eq!(delete_all_conversations(&db).await.unwrap(), 3);
        assert!(list_conversations(&db, ConversationOrder::CreatedDesc).await.unwrap().is_empty());
    }
}
