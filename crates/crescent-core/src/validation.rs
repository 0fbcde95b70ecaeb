// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Up-front input validation shared by every backend.
//!
//! Malformed input is rejected with [`CrescentError::Validation`] before any
//! storage round-trip, so both backends fail the same way on the same input.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::CrescentError;
use crate::types::{timestamp, ConversationPatch, NewConversation, NewMessage, MAX_TITLE_CHARS};

fn validate_title(title: &str) -> Result<(), CrescentError> {
    if title.trim().is_empty() {
        return Err(CrescentError::Validation(
            "conversation title must not be blank".to_string(),
        ));
    }
    let len = title.chars().count();
    if len > MAX_TITLE_CHARS {
        return Err(CrescentError::Validation(format!(
            "conversation title is {len} characters, limit is {MAX_TITLE_CHARS}"
        )));
    }
    Ok(())
}

fn validate_timestamp(field: &str, ts: &DateTime<Utc>) -> Result<(), CrescentError> {
    if timestamp::in_range(ts) {
        return Ok(());
    }
    Err(CrescentError::Validation(format!(
        "{field} {ts} is outside years {:04}-{:04}",
        timestamp::MIN_YEAR,
        timestamp::MAX_YEAR
    )))
}

pub fn validate_new_conversation(conversation: &NewConversation) -> Result<(), CrescentError> {
    validate_title(&conversation.title)
        .and_then(|()| validate_timestamp("conversation createdAt", &conversation.created_at))
        .and_then(|()| validate_timestamp("conversation updatedAt", &conversation.updated_at))
        .inspect_err(|e| debug!(error = %e, "rejected new conversation"))?;
    if conversation.updated_at < conversation.created_at {
        debug!("rejected new conversation: updated_at precedes created_at");
        return Err(CrescentError::Validation(
            "conversation updatedAt must not precede createdAt".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_patch(patch: &ConversationPatch) -> Result<(), CrescentError> {
    match &patch.title {
        Some(title) => validate_title(title),
        None => Ok(()),
    }
}

/// Message content may be empty (an assistant reply can be), the owner may not.
pub fn validate_new_message(message: &NewMessage) -> Result<(), CrescentError> {
    if message.conversation_id.trim().is_empty() {
        debug!("rejected new message without conversation id");
        return Err(CrescentError::Validation(
            "message conversationId must not be blank".to_string(),
        ));
    }
    validate_timestamp("message createdAt", &message.created_at)
        .inspect_err(|e| debug!(error = %e, "rejected new message"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use tracing_test::traced_test;

    #[test]
    fn accepts_ordinary_conversation() {
        assert!(validate_new_conversation(&NewConversation::new("hello")).is_ok());
    }

    #[traced_test]
    #[test]
    fn rejects_blank_title() {
        let err = validate_new_conversation(&NewConversation::new("   ")).unwrap_err();
        assert!(matches!(err, CrescentError::Validation(_)));
        assert!(logs_contain("rejected new conversation"));
    }

    #[test]
    fn rejects_overlong_title() {
        let title = "a".repeat(MAX_TITLE_CHARS + 1);
        assert!(validate_new_conversation(&NewConversation::new(title)).is_err());
    }

    #[test]
    fn rejects_updated_before_created() {
        let mut conv = NewConversation::new("t");
        conv.updated_at = conv.created_at - chrono::Duration::seconds(1);
        assert!(validate_new_conversation(&conv).is_err());
    }

    #[test]
    fn rejects_years_that_break_fixed_width_encoding() {
        use chrono::TimeZone;

        let mut conv = NewConversation::new("t");
        conv.created_at = Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap();
        conv.updated_at = conv.created_at;
        assert!(validate_new_conversation(&conv).is_ok());
        assert_eq!(timestamp::format(&conv.created_at).len(), 30);

        conv.updated_at = Utc.with_ymd_and_hms(10_000, 1, 1, 0, 0, 0).unwrap();
        let err = validate_new_conversation(&conv).unwrap_err();
        assert!(err.to_string().contains("updatedAt"), "{err}");

        let mut msg = NewMessage::new("c1", Role::User, "hi");
        msg.created_at = Utc.with_ymd_and_hms(-1, 1, 1, 0, 0, 0).unwrap();
        assert!(validate_new_message(&msg).is_err());
    }

    #[test]
    fn empty_patch_is_valid_blank_title_patch_is_not() {
        assert!(validate_patch(&ConversationPatch::default()).is_ok());
        assert!(validate_patch(&ConversationPatch::title("")).is_err());
    }

    #[test]
    fn message_needs_owner_but_not_content() {
        assert!(validate_new_message(&NewMessage::new("c1", Role::Assistant, "")).is_ok());
        assert!(validate_new_message(&NewMessage::new(" ", Role::User, "hi")).is_err());
    }
}
