// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the conversation, message, and settings API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crescent_core::{
    Conversation, ConversationOrder, ConversationPatch, EndpointSettings, HealthStatus, Message,
    NewConversation, NewMessage, Role, StorageAdapter,
};

use crate::error::{ApiError, ErrorResponse};
use crate::server::GatewayState;

/// Query string for GET /api/conversations.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub order: Option<ConversationOrder>,
}

/// The text of a new first message.
#[derive(Debug, Deserialize)]
pub struct FirstMessage {
    pub content: String,
}

/// Request body for POST /api/conversations.
#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    pub message: FirstMessage,
}

/// Request body for POST /api/conversations/{id}/messages.
#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub role: Role,
    pub content: String,
}

/// A conversation together with its ordered messages.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationDetail {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub messages: Vec<Message>,
}

/// Response body for DELETE /api/conversations.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteAllResponse {
    pub deleted: u64,
}

/// Response body for GET /health.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "ok", "degraded" or "unhealthy".
    pub status: String,
    /// Adapter name.
    pub backend: String,
    /// Binary version.
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub uptime_secs: u64,
}

/// GET /health
pub async fn get_health<S: StorageAdapter>(State(state): State<GatewayState<S>>) -> Response {
    let (code, status, detail) = match state.storage.health_check().await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "ok", None),
        Ok(HealthStatus::Degraded(why)) => (StatusCode::OK, "degraded", Some(why)),
        Ok(HealthStatus::Unhealthy(why)) => {
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", Some(why))
        }
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", Some(e.to_string()))
        }
    };
    let body = HealthResponse {
        status: status.to_string(),
        backend: state.storage.name().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        detail,
        uptime_secs: state.start_time.elapsed().as_secs(),
    };
    (code, Json(body)).into_response()
}

/// GET /api/conversations?order=created|updated
pub async fn list_conversations<S: StorageAdapter>(
    State(state): State<GatewayState<S>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Conversation>>, ApiError> {
    let order = query.order.unwrap_or(ConversationOrder::CreatedDesc);
    Ok(Json(state.storage.list_conversations(order).await?))
}

/// POST /api/conversations
///
/// Starts a thread from the user's first message; the title is derived
/// from that message.
pub async fn create_conversation<S: StorageAdapter>(
    State(state): State<GatewayState<S>>,
    Json(body): Json<CreateConversationRequest>,
) -> Result<(StatusCode, Json<ConversationDetail>), ApiError> {
    let content = body.message.content;
    let (conversation, first) = state
        .storage
        .start_conversation(NewConversation::from_first_message(&content), content)
        .await?;
    tracing::info!(id = %conversation.id, "conversation started");
    Ok((
        StatusCode::CREATED,
        Json(ConversationDetail {
            conversation,
            messages: vec![first],
        }),
    ))
}

/// GET /api/conversations/{id}
pub async fn get_conversation<S: StorageAdapter>(
    State(state): State<GatewayState<S>>,
    Path(id): Path<String>,
) -> Result<Json<ConversationDetail>, ApiError> {
    let conversation = state
        .storage
        .get_conversation(&id)
        .await?
        .ok_or_else(|| crescent_core::CrescentError::conversation_not_found(&id))?;
    let messages = state.storage.get_messages(&id).await?;
    Ok(Json(ConversationDetail {
        conversation,
        messages,
    }))
}

/// PATCH /api/conversations/{id}
pub async fn update_conversation<S: StorageAdapter>(
    State(state): State<GatewayState<S>>,
    Path(id): Path<String>,
    Json(patch): Json<ConversationPatch>,
) -> Result<Json<Conversation>, ApiError> {
    Ok(Json(state.storage.update_conversation(&id, patch).await?))
}

/// DELETE /api/conversations/{id}
pub async fn delete_conversation<S: StorageAdapter>(
    State(state): State<GatewayState<S>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.storage.delete_conversation(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/conversations
pub async fn delete_all_conversations<S: StorageAdapter>(
    State(state): State<GatewayState<S>>,
) -> Result<Json<DeleteAllResponse>, ApiError> {
    let deleted = state.storage.delete_all_conversations().await?;
    tracing::info!(deleted, "all conversations deleted");
    Ok(Json(DeleteAllResponse { deleted }))
}

/// GET /api/conversations/{id}/messages
pub async fn get_messages<S: StorageAdapter>(
    State(state): State<GatewayState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError> {
    Ok(Json(state.storage.get_messages(&id).await?))
}

/// POST /api/conversations/{id}/messages
pub async fn create_message<S: StorageAdapter>(
    State(state): State<GatewayState<S>>,
    Path(id): Path<String>,
    Json(body): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let message = state
        .storage
        .create_message(NewMessage::new(id, body.role, body.content))
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// DELETE /api/messages/{id}
pub async fn delete_message<S: StorageAdapter>(
    State(state): State<GatewayState<S>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.storage.delete_message(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn settings_unavailable() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("endpoint settings are not stored by this backend")),
    )
        .into_response()
}

/// GET /api/settings/endpoint
pub async fn get_endpoint_settings<S: StorageAdapter>(
    State(state): State<GatewayState<S>>,
) -> Result<Response, ApiError> {
    let Some(settings) = &state.settings else {
        return Ok(settings_unavailable());
    };
    Ok(Json(settings.get_custom_endpoint().await?).into_response())
}

/// PUT /api/settings/endpoint
///
/// Replaces both fields; a missing field is cleared.
pub async fn put_endpoint_settings<S: StorageAdapter>(
    State(state): State<GatewayState<S>>,
    Json(body): Json<EndpointSettings>,
) -> Result<Response, ApiError> {
    let Some(settings) = &state.settings else {
        return Ok(settings_unavailable());
    };
    settings
        .set_custom_endpoint(body.endpoint, body.model_name)
        .await?;
    Ok(Json(settings.get_custom_endpoint().await?).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_accepts_both_orders() {
        let q: ListQuery = serde_json::from_str(r#"{"order":"updated"}"#).unwrap();
        assert_eq!(q.order, Some(ConversationOrder::UpdatedDesc));
        let q: ListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.order, None);
    }

    #[test]
    fn create_message_request_requires_known_role() {
        let ok: CreateMessageRequest =
            serde_json::from_str(r#"{"role":"assistant","content":"hi"}"#).unwrap();
        assert_eq!(ok.role, Role::Assistant);
        let unknown = r#"{"role":"system","content":"x"}"#;
        assert!(serde_json::from_str::<CreateMessageRequest>(unknown).is_err());
    }

    #[test]
    fn conversation_detail_flattens_conversation() {
        let conversation = NewConversation::new("t").into_conversation("c1".into());
        let json = serde_json::to_value(ConversationDetail {
            conversation,
            messages: vec![],
        })
        .unwrap();
        assert_eq!(json["id"], "c1");
        assert_eq!(json["title"], "t");
        assert!(json["createdAt"].is_string());
        assert_eq!(json["messages"], serde_json::json!([]));
    }
}
