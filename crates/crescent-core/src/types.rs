// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across adapter trait boundaries.
//!
//! Field names serialize in camelCase so the persisted JSON shape is the same
//! for every backend and for the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Maximum number of characters kept when deriving a conversation title.
pub const MAX_TITLE_CHARS: usize = 80;

/// Title used when the first message has no visible characters.
pub const FALLBACK_TITLE: &str = "chat";

/// Author of a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One chat thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Conversation fields supplied by the caller; the adapter assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConversation {
    pub title: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl NewConversation {
    /// A conversation with the given title, stamped now.
    pub fn new(title: impl Into<String>) -> Self {
        let now = timestamp::now();
        Self {
            title: title.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// A conversation titled after the user's first message.
    pub fn from_first_message(content: &str) -> Self {
        Self::new(derive_title(content))
    }

    /// The user's opening message, stamped with this conversation's creation
    /// time.
    pub fn first_message(
        &self,
        conversation_id: impl Into<String>,
        content: impl Into<String>,
    ) -> NewMessage {
        NewMessage {
            content: content.into(),
            role: Role::User,
            conversation_id: conversation_id.into(),
            created_at: self.created_at,
        }
    }

    pub fn into_conversation(self, id: String) -> Conversation {
        Conversation {
            id,
            title: self.title,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Partial update for a conversation.
///
/// Only the title is mutable; the identifier and creation time never change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConversationPatch {
    #[serde(default)]
    pub title: Option<String>,
}

impl ConversationPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
        }
    }

    /// Merge this patch onto `current`.
    ///
    /// The last-updated timestamp is always refreshed and never moves
    /// backwards, even if the wall clock does.
    pub fn apply(&self, current: &Conversation, now: DateTime<Utc>) -> Conversation {
        let mut merged = current.clone();
        if let Some(title) = &self.title {
            merged.title = title.clone();
        }
        merged.updated_at = now.max(current.updated_at);
        merged
    }
}

/// One turn in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub content: String,
    pub role: Role,
    pub conversation_id: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Message fields supplied by the caller; the adapter assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub content: String,
    pub role: Role,
    pub conversation_id: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl NewMessage {
    pub fn new(conversation_id: impl Into<String>, role: Role, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            role,
            conversation_id: conversation_id.into(),
            created_at: timestamp::now(),
        }
    }

    pub fn into_message(self, id: String) -> Message {
        Message {
            id,
            content: self.content,
            role: self.role,
            conversation_id: self.conversation_id,
            created_at: self.created_at,
        }
    }
}

/// The user's completion-service endpoint choice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSettings {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Recency ordering for conversation listings. Both orders are newest first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum ConversationOrder {
    #[strum(serialize = "created")]
    #[serde(rename = "created")]
    CreatedDesc,
    #[strum(serialize = "updated")]
    #[serde(rename = "updated")]
    UpdatedDesc,
}

/// Which persistence backend a deployment is wired to.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Single-file object store living inside the client process.
    Embedded,
    /// SQLite with cascading foreign keys.
    #[default]
    Relational,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

/// Derive a conversation title from the first user message.
///
/// Trims surrounding whitespace and keeps at most [`MAX_TITLE_CHARS`]
/// characters. Blank input yields [`FALLBACK_TITLE`].
pub fn derive_title(first_message: &str) -> String {
    let truncated: String = first_message.trim().chars().take(MAX_TITLE_CHARS).collect();
    let truncated = truncated.trim_end();
    if truncated.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        truncated.to_string()
    }
}

/// Fixed-width RFC 3339 timestamp codec.
///
/// Every timestamp is written with nanosecond precision and a `Z` suffix, so
/// the text form sorts lexicographically in chronological order and parses
/// back to an identical value. Usable as a `#[serde(with = "timestamp")]`
/// module.
///
/// The width is fixed only for years `MIN_YEAR..=MAX_YEAR`; chrono writes a
/// sign and extra digits outside that range.
pub mod timestamp {
    use chrono::{DateTime, Datelike, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub const MIN_YEAR: i32 = 0;
    pub const MAX_YEAR: i32 = 9999;

    /// Whether `ts` encodes to the fixed-width form.
    pub fn in_range(ts: &DateTime<Utc>) -> bool {
        (MIN_YEAR..=MAX_YEAR).contains(&ts.year())
    }

    pub fn now() -> DateTime<Utc> {
        Utc::now()
    }

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }

    pub fn parse(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
    }

    pub fn serialize<S: Serializer>(
        ts: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(serde::de::Error::custom)
    }
}
