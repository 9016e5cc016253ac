//! Per-request-kind handlers for the bridge.
//!
//! Each handler leaves the device slots in a deterministic state: the
//! consumed request slot is cleared and the matching response slot holds
//! either a real value or an explicit empty string. A transport failure
//! leaves the request slot staged so the next tick retries it.

use crate::bridge::api::ApiClient;
use crate::bridge::dispatch::{classify, AuthKind, PendingRequest};
use crate::bridge::slots::{
    SlotStore, SLOT_AI_ANSWER, SLOT_AI_QUESTION, SLOT_AUTH, SLOT_OUTGOING, SLOT_RECEIVED,
    SLOT_SESSION,
};

/// Writes a response slot, logging failures without propagating them.
async fn write_response(store: &SlotStore, slot: &str, value: &str) {
    if let Err(e) = store.write_slot(slot, value).await {
        tracing::error!("❌ Response transfer to {} failed: {}", slot, e);
    }
}

/// Handles a login or signup request.
pub async fn handle_authentication(
    store: &SlotStore,
    api: &ApiClient,
    kind: AuthKind,
    username: &str,
    password: &str,
) {
    let label = match kind {
        AuthKind::Login => "LOGIN",
        AuthKind::Signup => "SIGNUP",
    };
    tracing::info!("🔐 Processing {} request for: {}", label, username);

    match api.authenticate(kind, username, password).await {
        Ok(session_id) => {
            tracing::info!("✅ {} successful for user: {}", label, username);
            store.clear_slot(SLOT_AUTH).await;
            write_response(store, SLOT_SESSION, &session_id).await;
        }
        Err(e) if e.is_transport() => {
            // Not consumed; the request slot stays staged for retry.
            tracing::error!("❌ Server connection error: {}", e);
            write_response(store, SLOT_SESSION, "").await;
        }
        Err(e) => {
            tracing::error!("❌ {} failed: {}", label, e);
            store.clear_slot(SLOT_AUTH).await;
            write_response(store, SLOT_SESSION, "").await;
        }
    }
}

/// Handles an outgoing message request.
pub async fn handle_send_message(
    store: &SlotStore,
    api: &ApiClient,
    session_id: &str,
    sender: &str,
    recipient: &str,
    body: &str,
) {
    tracing::info!("📤 Processing send message request");

    match api.send_message(session_id, sender, recipient, body).await {
        Ok(()) => {
            tracing::info!("✅ Message sent from {} to {}", sender, recipient);
            store.clear_slot(SLOT_OUTGOING).await;
        }
        Err(e) if e.is_transport() => {
            tracing::error!("❌ Server connection error: {}", e);
        }
        Err(e) => {
            tracing::error!("❌ Message send failed: {}", e);
            store.clear_slot(SLOT_OUTGOING).await;
        }
    }
}

/// Handles a receive poll: surfaces the latest queued message, or an empty
/// value when there is none (or the request failed).
pub async fn handle_receive_messages(store: &SlotStore, api: &ApiClient, session_id: &str) {
    match api.get_messages(session_id).await {
        Ok(messages) => match messages.last() {
            Some(latest) => {
                tracing::info!("📨 New message from {}", latest.sender);
                let formatted = format!("FROM: {}\nMSG: {}", latest.sender, latest.message);
                write_response(store, SLOT_RECEIVED, &formatted).await;
            }
            None => {
                tracing::debug!("No new messages");
                write_response(store, SLOT_RECEIVED, "").await;
            }
        },
        Err(e) => {
            tracing::error!("❌ Message receive failed: {}", e);
            write_response(store, SLOT_RECEIVED, "").await;
        }
    }
}

/// Handles an AI question request.
pub async fn handle_ai_question(
    store: &SlotStore,
    api: &ApiClient,
    session_id: &str,
    username: &str,
    question: &str,
) {
    tracing::info!("🤖 Processing AI question from: {}", username);

    match api.ask_ai(session_id, username, question).await {
        Ok(answer) => {
            tracing::info!("✅ AI answer received ({} chars)", answer.len());
            store.clear_slot(SLOT_AI_QUESTION).await;
            write_response(store, SLOT_AI_ANSWER, &answer).await;
        }
        Err(e) if e.is_transport() => {
            tracing::error!("❌ Server connection error: {}", e);
            write_response(store, SLOT_AI_ANSWER, "").await;
        }
        Err(e) => {
            tracing::error!("❌ AI question failed: {}", e);
            store.clear_slot(SLOT_AI_QUESTION).await;
            write_response(store, SLOT_AI_ANSWER, "").await;
        }
    }
}

/// Clears a request slot whose content failed validation.
///
/// Malformed input is dropped without a response: a corrupted request
/// cannot reliably address one. A bad auth envelope also clears the
/// session response so the device sees "no session", not a stale one.
pub async fn handle_malformed(store: &SlotStore, slot: &'static str) {
    tracing::warn!("⚠️ Malformed content in {}, clearing", slot);
    store.clear_slot(slot).await;

    if slot == SLOT_AUTH {
        write_response(store, SLOT_SESSION, "").await;
    }
}

/// Runs one poll tick: snapshot the slots, classify, dispatch at most one
/// request.
pub async fn process_tick(store: &SlotStore, api: &ApiClient) {
    let snapshot = store.snapshot().await;

    match classify(&snapshot) {
        PendingRequest::Auth {
            kind,
            username,
            password,
        } => handle_authentication(store, api, kind, &username, &password).await,
        PendingRequest::AiQuestion {
            session_id,
            username,
            question,
        } => handle_ai_question(store, api, &session_id, &username, &question).await,
        PendingRequest::SendMessage {
            session_id,
            sender,
            recipient,
            body,
        } => handle_send_message(store, api, &session_id, &sender, &recipient, &body).await,
        PendingRequest::ReceiveMessages { session_id } => {
            handle_receive_messages(store, api, &session_id).await
        }
        PendingRequest::Malformed { slot } => handle_malformed(store, slot).await,
        PendingRequest::Idle => {}
    }
}
