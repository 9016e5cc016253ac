use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use calclink::app::build_router;
use calclink::config::ServerConfig;
use calclink::state::AppState;

fn test_config() -> ServerConfig {
    ServerConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        ai_relay_url: None,
        ai_relay_timeout: Duration::from_secs(1),
        message_queue_cap: 1000,
        trim_messages_on_read: false,
        session_sweep_interval: Duration::from_secs(3600),
    }
}

fn test_app() -> Router {
    let state = AppState::new(&test_config()).unwrap();
    build_router(state)
}

async fn request(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");

    let request = match body {
        Some(value) => builder
            .body(Body::from(serde_json::to_vec(&value).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    request(app, Method::POST, uri, Some(body)).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    request(app, Method::GET, uri, None).await
}

async fn signup(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = post(
        app,
        "/signup",
        json!({ "username": username, "password": password }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "signup failed: {body}");
    body["session_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn signup_and_login_roundtrip() {
    let app = test_app();

    let (status, body) = post(
        &app,
        "/signup",
        json!({ "username": "bob", "password": "pass1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["username"], "bob");
    assert!(!body["session_id"].as_str().unwrap().is_empty());

    let (status, body) = post(
        &app,
        "/login",
        json!({ "username": "bob", "password": "pass1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
}

#[tokio::test]
async fn duplicate_signup_is_rejected() {
    let app = test_app();
    signup(&app, "bob", "pass1").await;

    let (status, body) = post(
        &app,
        "/signup",
        json!({ "username": "bob", "password": "other" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username already exists");
}

#[tokio::test]
async fn signup_validates_field_lengths() {
    let app = test_app();

    let (status, body) = post(
        &app,
        "/signup",
        json!({ "username": "ab", "password": "pass1" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username must be at least 3 characters");

    let (status, body) = post(
        &app,
        "/signup",
        json!({ "username": "bob", "password": "abc" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Password must be at least 4 characters");

    let (status, body) = post(&app, "/signup", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username and password required");
}

#[tokio::test]
async fn login_with_bad_credentials_is_unauthorized() {
    let app = test_app();
    signup(&app, "bob", "pass1").await;

    let (status, body) = post(
        &app,
        "/login",
        json!({ "username": "bob", "password": "wrong" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, _) = post(
        &app,
        "/login",
        json!({ "username": "ghost", "password": "pass1" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn send_and_receive_message() {
    let app = test_app();
    signup(&app, "bob", "pass1").await;
    let alice_session = signup(&app, "alice", "pass2").await;

    let (status, body) = post(
        &app,
        "/send_message",
        json!({
            "session_id": alice_session,
            "sender": "alice",
            "recipient": "bob",
            "message": "see you at 5:30"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Message sent successfully");
    assert!(body["timestamp"].as_str().unwrap().len() == 19);

    let bob_session = {
        let (_, body) = post(
            &app,
            "/login",
            json!({ "username": "bob", "password": "pass1" }),
        )
        .await;
        body["session_id"].as_str().unwrap().to_string()
    };

    let (status, body) = get(&app, &format!("/get_messages?session_id={bob_session}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["messages"][0]["sender"], "alice");
    assert_eq!(body["messages"][0]["message"], "see you at 5:30");
}

#[tokio::test]
async fn send_to_self_succeeds() {
    let app = test_app();
    let session = signup(&app, "bob", "pass1").await;

    let (status, _) = post(
        &app,
        "/send_message",
        json!({
            "session_id": session,
            "sender": "bob",
            "recipient": "bob",
            "message": "hi"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&app, &format!("/get_messages?session_id={session}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["messages"][0]["sender"], "bob");
    assert_eq!(body["messages"][0]["message"], "hi");
}

#[tokio::test]
async fn spoofed_sender_is_rejected() {
    let app = test_app();
    signup(&app, "alice", "pass1").await;
    let bob_session = signup(&app, "bob", "pass2").await;

    let (status, body) = post(
        &app,
        "/send_message",
        json!({
            "session_id": bob_session,
            "sender": "alice",
            "recipient": "bob",
            "message": "hi"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Session user mismatch");
}

#[tokio::test]
async fn unknown_recipient_is_not_found() {
    let app = test_app();
    let session = signup(&app, "bob", "pass1").await;

    let (status, body) = post(
        &app,
        "/send_message",
        json!({
            "session_id": session,
            "sender": "bob",
            "recipient": "ghost",
            "message": "hi"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Recipient not found");
}

#[tokio::test]
async fn get_messages_requires_valid_session() {
    let app = test_app();

    let (status, body) = get(&app, "/get_messages").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Session ID required");

    let (status, body) = get(&app, "/get_messages?session_id=not-a-session").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired session");
}

#[tokio::test]
async fn ai_question_without_upstream_stores_sentinel() {
    let app = test_app();
    let session = signup(&app, "bob", "pass1").await;

    let (status, body) = post(
        &app,
        "/ai_question",
        json!({
            "session_id": session,
            "username": "bob",
            "question": "what is 2+2?"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "AI question answered");
    assert_eq!(body["answer"], "ERROR: AI SERVICE UNAVAILABLE");
    assert_eq!(body["timestamp"].as_str().unwrap().len(), 19);

    let (status, body) = get(&app, &format!("/get_ai_response?session_id={session}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "what is 2+2?");
    assert_eq!(body["answer"], "ERROR: AI SERVICE UNAVAILABLE");
}

#[tokio::test]
async fn ai_timeout_sentinel_is_stored_and_returned() {
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "answer": "too late" }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&upstream)
        .await;

    let config = ServerConfig {
        ai_relay_url: Some(upstream.uri()),
        ai_relay_timeout: Duration::from_millis(50),
        ..test_config()
    };
    let app = build_router(AppState::new(&config).unwrap());

    let session = signup(&app, "bob", "pass1").await;

    let (status, body) = post(
        &app,
        "/ai_question",
        json!({
            "session_id": session,
            "username": "bob",
            "question": "anyone there?"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "ERROR: AI REQUEST FAILED");

    let (_, body) = get(&app, &format!("/get_ai_response?session_id={session}")).await;
    assert_eq!(body["answer"], "ERROR: AI REQUEST FAILED");
}

#[tokio::test]
async fn ai_question_rejects_username_mismatch() {
    let app = test_app();
    signup(&app, "alice", "pass1").await;
    let bob_session = signup(&app, "bob", "pass2").await;

    let (status, body) = post(
        &app,
        "/ai_question",
        json!({
            "session_id": bob_session,
            "username": "alice",
            "question": "why?"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Session user mismatch");
}

#[tokio::test]
async fn get_ai_response_is_empty_before_any_question() {
    let app = test_app();
    let session = signup(&app, "bob", "pass1").await;

    let (status, body) = get(&app, &format!("/get_ai_response?session_id={session}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "");
    assert_eq!(body["answer"], "");
}

#[tokio::test]
async fn status_and_users_report_counts() {
    let app = test_app();
    let session = signup(&app, "bob", "pass1").await;
    signup(&app, "alice", "pass2").await;

    post(
        &app,
        "/send_message",
        json!({
            "session_id": session,
            "sender": "bob",
            "recipient": "alice",
            "message": "hi"
        }),
    )
    .await;

    let (status, body) = get(&app, "/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["server"], "CalcLink Message Server");
    assert_eq!(body["status"], "running");
    assert_eq!(body["users"], 2);
    assert_eq!(body["active_sessions"], 2);
    assert_eq!(body["total_messages"], 1);

    let (status, body) = get(&app, "/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["users"], json!(["alice", "bob"]));
}
