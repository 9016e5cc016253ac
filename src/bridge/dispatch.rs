//! Request-kind detection over a slot snapshot.
//!
//! Classification is a pure function from the current slot contents to the
//! single request chosen for this tick, decoupled from the I/O that
//! produced the snapshot.

use crate::bridge::envelope::{self, EnvelopeError};
use crate::bridge::slots::{SLOT_AI_QUESTION, SLOT_AUTH, SLOT_OUTGOING};

/// The raw contents of the four request slots at one poll tick.
#[derive(Debug, Clone, Default)]
pub struct SlotSnapshot {
    /// The auth request slot (`LOGIN`/`SIGNUP` envelope).
    pub auth: Option<String>,
    /// The outgoing message slot (`sender:recipient:body` envelope).
    pub outgoing: Option<String>,
    /// The AI question slot (`AI:username:question` envelope).
    pub ai_question: Option<String>,
    /// The session-id echo slot.
    pub session: Option<String>,
}

/// Which authentication operation an auth envelope requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKind {
    Login,
    Signup,
}

/// The single request chosen for one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingRequest {
    /// A login or signup request.
    Auth {
        kind: AuthKind,
        username: String,
        password: String,
    },
    /// An AI question from an authenticated user.
    AiQuestion {
        session_id: String,
        username: String,
        question: String,
    },
    /// An outgoing message from an authenticated user.
    SendMessage {
        session_id: String,
        sender: String,
        recipient: String,
        body: String,
    },
    /// A receive poll: session present, nothing else staged.
    ReceiveMessages { session_id: String },
    /// A populated request slot that failed validation; the named slot is
    /// cleared without a response.
    Malformed { slot: &'static str },
    /// Nothing to do this tick.
    Idle,
}

fn sanitized(slot: &Option<String>) -> Option<String> {
    slot.as_deref().and_then(|raw| envelope::sanitize(raw).ok())
}

/// What a request slot holds after sanitization.
enum SlotContent {
    /// Nothing staged: missing, whitespace, or a bare quote pair.
    Empty,
    /// A sanitized value ready for field parsing.
    Value(String),
    /// Content that is present but fails validation.
    Invalid,
}

fn inspect(slot: &Option<String>) -> SlotContent {
    match slot.as_deref() {
        None => SlotContent::Empty,
        Some(raw) => match envelope::sanitize(raw) {
            Ok(value) => SlotContent::Value(value),
            Err(EnvelopeError::Empty) => SlotContent::Empty,
            Err(_) => SlotContent::Invalid,
        },
    }
}

fn classify_auth(raw: &str) -> PendingRequest {
    match envelope::parse_fields(raw) {
        Ok([tag, username, password]) => match tag.to_uppercase().as_str() {
            "LOGIN" => PendingRequest::Auth {
                kind: AuthKind::Login,
                username,
                password,
            },
            "SIGNUP" => PendingRequest::Auth {
                kind: AuthKind::Signup,
                username,
                password,
            },
            _ => PendingRequest::Malformed { slot: SLOT_AUTH },
        },
        Err(_) => PendingRequest::Malformed { slot: SLOT_AUTH },
    }
}

/// Chooses the single request for this tick.
///
/// Priority order, first match wins: authentication, AI question, send
/// message, receive poll. Authentication always pre-empts other work so a
/// stale session slot is never used against payloads meant for a fresh
/// login. A slot that sanitizes to empty (whitespace or a bare quote
/// pair) counts as unpopulated and falls through to the next priority.
pub fn classify(snapshot: &SlotSnapshot) -> PendingRequest {
    let auth = match inspect(&snapshot.auth) {
        SlotContent::Value(value) => Some(value),
        SlotContent::Invalid => return PendingRequest::Malformed { slot: SLOT_AUTH },
        SlotContent::Empty => None,
    };
    if let Some(raw) = auth {
        return classify_auth(&raw);
    }

    let Some(session_id) = sanitized(&snapshot.session) else {
        return PendingRequest::Idle;
    };

    match inspect(&snapshot.ai_question) {
        SlotContent::Value(raw) => {
            return match envelope::parse_fields(&raw) {
                Ok([tag, username, question]) if tag.to_uppercase() == "AI" => {
                    PendingRequest::AiQuestion {
                        session_id,
                        username,
                        question,
                    }
                }
                _ => PendingRequest::Malformed {
                    slot: SLOT_AI_QUESTION,
                },
            };
        }
        SlotContent::Invalid => {
            return PendingRequest::Malformed {
                slot: SLOT_AI_QUESTION,
            };
        }
        SlotContent::Empty => {}
    }

    match inspect(&snapshot.outgoing) {
        SlotContent::Value(raw) => {
            return match envelope::parse_fields(&raw) {
                Ok([sender, recipient, body]) => PendingRequest::SendMessage {
                    session_id,
                    sender,
                    recipient,
                    body,
                },
                Err(_) => PendingRequest::Malformed {
                    slot: SLOT_OUTGOING,
                },
            };
        }
        SlotContent::Invalid => {
            return PendingRequest::Malformed {
                slot: SLOT_OUTGOING,
            };
        }
        SlotContent::Empty => {}
    }

    PendingRequest::ReceiveMessages { session_id }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> SlotSnapshot {
        SlotSnapshot::default()
    }

    #[test]
    fn auth_preempts_populated_session_and_message() {
        let snap = SlotSnapshot {
            auth: Some("LOGIN:alice:secret".to_string()),
            outgoing: Some("alice:bob:hi".to_string()),
            ai_question: Some("AI:alice:why".to_string()),
            session: Some("abc123".to_string()),
        };

        assert_eq!(
            classify(&snap),
            PendingRequest::Auth {
                kind: AuthKind::Login,
                username: "alice".to_string(),
                password: "secret".to_string(),
            }
        );
    }

    #[test]
    fn signup_tag_is_case_insensitive() {
        let snap = SlotSnapshot {
            auth: Some("signup:bob:pass1".to_string()),
            ..snapshot()
        };

        assert!(matches!(
            classify(&snap),
            PendingRequest::Auth {
                kind: AuthKind::Signup,
                ..
            }
        ));
    }

    #[test]
    fn ai_question_beats_outgoing_message() {
        let snap = SlotSnapshot {
            outgoing: Some("alice:bob:hi".to_string()),
            ai_question: Some("AI:alice:what is 2+2".to_string()),
            session: Some("abc123".to_string()),
            ..snapshot()
        };

        assert_eq!(
            classify(&snap),
            PendingRequest::AiQuestion {
                session_id: "abc123".to_string(),
                username: "alice".to_string(),
                question: "what is 2+2".to_string(),
            }
        );
    }

    #[test]
    fn message_with_session_dispatches_send() {
        let snap = SlotSnapshot {
            outgoing: Some("alice:bob:see you at 5:30".to_string()),
            session: Some("abc123".to_string()),
            ..snapshot()
        };

        assert_eq!(
            classify(&snap),
            PendingRequest::SendMessage {
                session_id: "abc123".to_string(),
                sender: "alice".to_string(),
                recipient: "bob".to_string(),
                body: "see you at 5:30".to_string(),
            }
        );
    }

    #[test]
    fn session_alone_dispatches_receive() {
        let snap = SlotSnapshot {
            session: Some("\"abc123\"".to_string()),
            ..snapshot()
        };

        assert_eq!(
            classify(&snap),
            PendingRequest::ReceiveMessages {
                session_id: "abc123".to_string()
            }
        );
    }

    #[test]
    fn message_without_session_is_idle() {
        let snap = SlotSnapshot {
            outgoing: Some("alice:bob:hi".to_string()),
            ..snapshot()
        };

        assert_eq!(classify(&snap), PendingRequest::Idle);
    }

    #[test]
    fn empty_snapshot_is_idle() {
        assert_eq!(classify(&snapshot()), PendingRequest::Idle);
    }

    #[test]
    fn unknown_auth_tag_is_malformed() {
        let snap = SlotSnapshot {
            auth: Some("DELETE:alice:secret".to_string()),
            ..snapshot()
        };

        assert_eq!(
            classify(&snap),
            PendingRequest::Malformed { slot: SLOT_AUTH }
        );
    }

    #[test]
    fn two_field_message_is_malformed() {
        let snap = SlotSnapshot {
            outgoing: Some("alice:hi".to_string()),
            session: Some("abc123".to_string()),
            ..snapshot()
        };

        assert_eq!(
            classify(&snap),
            PendingRequest::Malformed {
                slot: SLOT_OUTGOING
            }
        );
    }

    #[test]
    fn quoted_empty_auth_slot_falls_through_to_receive() {
        let snap = SlotSnapshot {
            auth: Some("\"\"".to_string()),
            session: Some("abc123".to_string()),
            ..snapshot()
        };

        assert_eq!(
            classify(&snap),
            PendingRequest::ReceiveMessages {
                session_id: "abc123".to_string()
            }
        );
    }

    #[test]
    fn blank_request_slots_are_not_malformed() {
        let snap = SlotSnapshot {
            outgoing: Some("  ".to_string()),
            ai_question: Some("\"\"".to_string()),
            session: Some("abc123".to_string()),
            ..snapshot()
        };

        assert_eq!(
            classify(&snap),
            PendingRequest::ReceiveMessages {
                session_id: "abc123".to_string()
            }
        );
    }

    #[test]
    fn oversized_auth_slot_is_malformed() {
        let snap = SlotSnapshot {
            auth: Some(format!("LOGIN:alice:{}", "x".repeat(2100))),
            ..snapshot()
        };

        assert_eq!(
            classify(&snap),
            PendingRequest::Malformed { slot: SLOT_AUTH }
        );
    }
}
