//! Messaging endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;
use vetwatch_common::events::VetEvent;

use super::forms::{record_submission, require_valid};
use crate::forms::{FieldValues, FormType};
use crate::store::models::{Message, NewMessage};
use crate::{ApiError, ApiResult, AppState};

/// Conversation with one user, as shown in the contact list
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub user_id: Uuid,
    /// Oldest first
    pub messages: Vec<Message>,
    pub last_message: Option<Message>,
    /// Unread messages sent by this user
    pub unread_count: usize,
}

/// GET /api/messages
pub async fn list_messages(State(state): State<AppState>) -> Json<Vec<Message>> {
    Json(state.store.messages().await)
}

/// GET /api/messages/conversation/:user_id
pub async fn conversation(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Json<ConversationResponse> {
    let messages = state.store.conversation(user_id).await;
    let last_message = state.store.last_message(user_id).await;
    let unread_count = state.store.unread_count(user_id).await;

    Json(ConversationResponse {
        user_id,
        messages,
        last_message,
        unread_count,
    })
}

/// POST /api/messages
///
/// Body uses the messaging form fields (`content`, `receiverId`,
/// `attachments`) plus `senderId`.
///
/// **Errors:**
/// - 400 Bad Request: validation failed, unknown sender or recipient, or nothing to send
pub async fn send_message(
    State(state): State<AppState>,
    Json(data): Json<FieldValues>,
) -> ApiResult<(StatusCode, Json<Message>)> {
    require_valid(FormType::Messaging, &data)?;

    let new: NewMessage = serde_json::from_value(Value::Object(data.clone()))
        .map_err(|e| ApiError::BadRequest(format!("Invalid message payload: {}", e)))?;

    if new.content.trim().is_empty() && new.attachments.is_empty() {
        return Err(ApiError::BadRequest("Message has no content".to_string()));
    }

    if state.store.find_user(new.sender_id).await.is_none() {
        return Err(ApiError::BadRequest(format!("Unknown sender: {}", new.sender_id)));
    }

    if state.store.find_user(new.receiver_id).await.is_none() {
        return Err(ApiError::BadRequest(format!("Unknown recipient: {}", new.receiver_id)));
    }

    let message = state.store.add_message(Message::send(new)).await;
    record_submission(&state, FormType::Messaging.as_str(), data).await;

    info!(
        message_id = %message.id,
        attachments = message.attachments.len(),
        "Message sent"
    );

    state.event_bus.emit_lossy(VetEvent::MessageSent {
        message_id: message.id,
        sender_id: message.sender_id,
        receiver_id: message.receiver_id,
        timestamp: message.timestamp,
    });

    Ok((StatusCode::CREATED, Json(message)))
}

/// POST /api/messages/:id/read
pub async fn mark_message_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Message>> {
    Ok(Json(state.store.mark_message_read(id).await?))
}

/// Build messaging routes
pub fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/api/messages", get(list_messages).post(send_message))
        .route("/api/messages/conversation/:user_id", get(conversation))
        .route("/api/messages/:id/read", post(mark_message_read))
}
