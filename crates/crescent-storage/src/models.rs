// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row mapping between SQLite and the core domain types.
//!
//! Timestamps are stored as fixed-width RFC 3339 text so `ORDER BY` on the
//! column sorts chronologically.

use std::str::FromStr;

use rusqlite::Row;
use rusqlite::types::Type;

use crescent_core::types::timestamp;
pub use crescent_core::types::{Conversation, Message, Role};

fn conversion_error(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<chrono::DateTime<chrono::Utc>> {
    let text: String = row.get(idx)?;
    timestamp::parse(&text).map_err(|e| conversion_error(idx, e))
}

/// Columns: `id, title, created_at, updated_at`.
pub fn conversation_from_row(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        title: row.get(1)?,
        created_at: timestamp_at(row, 2)?,
        updated_at: timestamp_at(row, 3)?,
    })
}

/// Columns: `id, conversation_id, role, content, created_at`.
pub fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    let role: String = row.get(2)?;
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        role: Role::from_str(&role).map_err(|e| conversion_error(2, e))?,
        content: row.get(3)?,
        created_at: timestamp_at(row, 4)?,
    })
}
