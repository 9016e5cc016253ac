use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, Result},
    models::message::Message,
    state::AppState,
};

/// The request payload for sending a message.
#[derive(Deserialize, Debug)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub recipient: String,
    #[serde(default)]
    pub message: String,
}

/// The response payload for a delivered message.
#[derive(Serialize)]
pub struct SendMessageResponse {
    pub message: String,
    pub timestamp: String,
}

/// The query parameters for message retrieval.
#[derive(Deserialize, Debug)]
pub struct SessionQuery {
    pub session_id: Option<String>,
}

/// The response payload for message retrieval.
#[derive(Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
    pub count: usize,
}

/// Handles sending a message to a recipient's queue.
#[axum::debug_handler]
pub async fn send_message(
    State(state): State<AppState>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<impl IntoResponse> {
    let stored = state.registry.send_message(
        &payload.session_id,
        &payload.sender,
        &payload.recipient,
        &payload.message,
        Utc::now(),
    )?;

    tracing::info!(
        "✅ Message sent from {} to {}",
        payload.sender,
        payload.recipient
    );

    let response = SendMessageResponse {
        message: "Message sent successfully".to_string(),
        timestamp: stored.formatted_time(),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Handles retrieving the accumulated messages for the session's user.
#[axum::debug_handler]
pub async fn get_messages(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<impl IntoResponse> {
    let session_id = query
        .session_id
        .ok_or(AppError::MissingFields("Session ID required"))?;

    let messages = state.registry.get_messages(&session_id, Utc::now())?;

    let response = MessagesResponse {
        count: messages.len(),
        messages,
    };

    Ok((StatusCode::OK, Json(response)))
}
