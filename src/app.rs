use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};
use tracing::Level;

use crate::handlers;
use crate::state::AppState;

/// Builds the server's router.
///
/// Kept separate from the binary so integration tests can drive the full
/// stack in-process.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/signup", post(handlers::auth::signup))
        .route("/login", post(handlers::auth::login))
        .route("/send_message", post(handlers::messages::send_message))
        .route("/get_messages", get(handlers::messages::get_messages))
        .route("/ai_question", post(handlers::ai::ai_question))
        .route("/get_ai_response", get(handlers::ai::get_ai_response))
        .route("/status", get(handlers::status::status))
        .route("/users", get(handlers::status::list_users))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .with_state(state)
}
