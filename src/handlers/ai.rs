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
    handlers::messages::SessionQuery,
    state::AppState,
};

/// The request payload for forwarding an AI question.
#[derive(Deserialize, Debug)]
pub struct AiQuestionRequest {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub question: String,
}

/// The response payload for an answered AI question.
#[derive(Serialize)]
pub struct AiQuestionResponse {
    pub message: String,
    pub answer: String,
    pub timestamp: String,
}

/// The response payload for the latest stored AI answer.
#[derive(Serialize)]
pub struct AiLatestResponse {
    pub response: String,
    pub answer: String,
}

/// Handles forwarding a question to the AI relay.
///
/// The session is validated before the relay call; the relay's outcome is
/// recorded unconditionally, sentinels included.
#[axum::debug_handler]
pub async fn ai_question(
    State(state): State<AppState>,
    Json(payload): Json<AiQuestionRequest>,
) -> Result<impl IntoResponse> {
    let question = payload.question.trim();
    if question.is_empty() {
        return Err(AppError::MissingFields(
            "Session ID, username, and question required",
        ));
    }

    state
        .registry
        .authorize_ai(&payload.session_id, &payload.username, Utc::now())?;

    tracing::info!("🤖 Forwarding AI question from {}", payload.username);

    let answer = state.relay.ask(question).await;

    let stored =
        state
            .registry
            .record_ai_response(&payload.username, question, &answer, Utc::now());

    let response = AiQuestionResponse {
        message: "AI question answered".to_string(),
        timestamp: stored.formatted_time(),
        answer: stored.answer,
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Handles retrieving the most recent AI answer for the session's user.
#[axum::debug_handler]
pub async fn get_ai_response(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<impl IntoResponse> {
    let session_id = query
        .session_id
        .ok_or(AppError::MissingFields("Session ID required"))?;

    let latest = state
        .registry
        .latest_ai_response(&session_id, Utc::now())?;

    let response = match latest {
        Some(entry) => AiLatestResponse {
            response: entry.question,
            answer: entry.answer,
        },
        None => AiLatestResponse {
            response: String::new(),
            answer: String::new(),
        },
    };

    Ok((StatusCode::OK, Json(response)))
}
