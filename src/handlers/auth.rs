use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{error::Result, state::AppState};

/// The request payload for signup and login.
///
/// Fields default to empty strings so a missing field surfaces as the
/// domain's 400 rather than a framework deserialization error.
#[derive(Deserialize, Debug)]
pub struct AuthRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// The response payload for successful signup and login.
#[derive(Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub session_id: String,
    pub username: String,
}

/// Handles user signup.
#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<AuthRequest>,
) -> Result<impl IntoResponse> {
    tracing::info!("📝 Signup attempt for: {}", payload.username.trim());

    let session = state
        .registry
        .signup(&payload.username, &payload.password, Utc::now())?;

    let response = AuthResponse {
        message: "User created successfully".to_string(),
        session_id: session.id.to_string(),
        username: session.username,
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Handles user login.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<AuthRequest>,
) -> Result<impl IntoResponse> {
    tracing::info!("🔐 Login attempt for: {}", payload.username.trim());

    let session = state
        .registry
        .login(&payload.username, &payload.password, Utc::now())?;

    let response = AuthResponse {
        message: "Login successful".to_string(),
        session_id: session.id.to_string(),
        username: session.username,
    };

    Ok((StatusCode::OK, Json(response)))
}
