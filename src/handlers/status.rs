use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde::Serialize;

use crate::{error::Result, state::AppState};

/// The server identity reported by `/status`.
pub const SERVER_IDENTITY: &str = "CalcLink Message Server";

/// The response payload for the status endpoint.
#[derive(Serialize)]
pub struct StatusResponse {
    pub server: &'static str,
    pub status: &'static str,
    pub users: usize,
    pub active_sessions: usize,
    pub total_messages: usize,
    pub timestamp: String,
}

/// The response payload for the user listing endpoint.
#[derive(Serialize)]
pub struct UsersResponse {
    pub users: Vec<String>,
    pub count: usize,
}

/// Reports aggregate counters and server identity.
#[axum::debug_handler]
pub async fn status(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let now = Utc::now();
    let stats = state.registry.stats(now);

    let response = StatusResponse {
        server: SERVER_IDENTITY,
        status: "running",
        users: stats.users,
        active_sessions: stats.active_sessions,
        total_messages: stats.total_messages,
        timestamp: now.to_rfc3339(),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Lists every registered username.
#[axum::debug_handler]
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let users = state.registry.usernames();

    let response = UsersResponse {
        count: users.len(),
        users,
    };

    Ok((StatusCode::OK, Json(response)))
}
