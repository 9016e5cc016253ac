use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::message::{AiResponse, Message};
use crate::models::session::Session;
use crate::models::user::User;
use crate::services::auth;
use crate::validation::auth::{validate_password, validate_username};

/// Aggregate counters served by `/status`.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryStats {
    /// The total number of registered users.
    pub users: usize,
    /// The number of sessions still valid at the query instant.
    pub active_sessions: usize,
    /// The total number of queued messages across all recipients.
    pub total_messages: usize,
}

#[derive(Default)]
struct RegistryInner {
    users: HashMap<String, User>,
    sessions: HashMap<String, Session>,
    messages: HashMap<String, VecDeque<Message>>,
    ai_responses: HashMap<String, VecDeque<AiResponse>>,
}

impl RegistryInner {
    /// Resolves a session id to its username, judged at `now`.
    fn session_username(&self, session_id: &str, now: DateTime<Utc>) -> Result<String> {
        let session = self
            .sessions
            .get(session_id)
            .ok_or(AppError::InvalidSession)?;

        if !session.is_valid_at(now) {
            return Err(AppError::InvalidSession);
        }

        Ok(session.username.clone())
    }
}

/// The authoritative in-memory store of users, sessions, and per-user
/// message/AI-response queues.
///
/// All registry state lives for the process lifetime only. A single
/// registry-wide mutex serializes mutations; critical sections never
/// perform I/O.
pub struct Registry {
    inner: Mutex<RegistryInner>,
    queue_cap: usize,
    trim_on_read: bool,
}

/// Appends to a bounded queue, dropping the oldest entry when full.
fn push_capped<T>(queue: &mut VecDeque<T>, item: T, cap: usize) {
    if queue.len() >= cap {
        queue.pop_front();
    }
    queue.push_back(item);
}

impl Registry {
    /// Creates an empty registry.
    ///
    /// # Arguments
    ///
    /// * `queue_cap` - The per-user bound on message and AI-response queues.
    /// * `trim_on_read` - Whether `get_messages` drains the queue it returns.
    pub fn new(queue_cap: usize, trim_on_read: bool) -> Self {
        Self {
            inner: Mutex::new(RegistryInner::default()),
            queue_cap: queue_cap.max(1),
            trim_on_read,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates a new user and an initial session.
    ///
    /// # Arguments
    ///
    /// * `username` - The requested username, unique among all users.
    /// * `password` - The plaintext password, digested before storage.
    /// * `now` - The instant of the request.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `Session`.
    pub fn signup(&self, username: &str, password: &str, now: DateTime<Utc>) -> Result<Session> {
        let username = username.trim();
        let password = password.trim();

        if username.is_empty() || password.is_empty() {
            return Err(AppError::MissingFields("Username and password required"));
        }

        validate_username(username)?;
        validate_password(password)?;

        let mut inner = self.lock();

        if inner.users.contains_key(username) {
            return Err(AppError::UsernameTaken);
        }

        inner.users.insert(
            username.to_string(),
            User {
                username: username.to_string(),
                password_digest: auth::hash_password(password),
                created_at: now,
            },
        );
        inner.messages.entry(username.to_string()).or_default();
        inner.ai_responses.entry(username.to_string()).or_default();

        let session = Session::new(username, now);
        inner
            .sessions
            .insert(session.id.to_string(), session.clone());

        tracing::info!("✅ New user registered: {}", username);

        Ok(session)
    }

    /// Authenticates a user and creates a new session.
    ///
    /// # Arguments
    ///
    /// * `username` - The claimed username.
    /// * `password` - The plaintext password to verify.
    /// * `now` - The instant of the request.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `Session`.
    pub fn login(&self, username: &str, password: &str, now: DateTime<Utc>) -> Result<Session> {
        let username = username.trim();
        let password = password.trim();

        if username.is_empty() || password.is_empty() {
            return Err(AppError::MissingFields("Username and password required"));
        }

        let mut inner = self.lock();

        // The digest comparison runs against a dummy target when the user
        // is unknown, keeping the check's shape independent of the lookup.
        let stored = inner
            .users
            .get(username)
            .map(|u| u.password_digest.clone());

        if !auth::verify_password(password, stored.as_deref()) {
            return Err(AppError::InvalidCredentials);
        }

        let session = Session::new(username, now);
        inner
            .sessions
            .insert(session.id.to_string(), session.clone());

        tracing::info!("✅ User logged in: {}", username);

        Ok(session)
    }

    /// Appends a message to the recipient's queue.
    ///
    /// The authenticated session's username must equal the claimed sender;
    /// a valid session cannot be used to spoof another identity. Sending to
    /// oneself is allowed.
    ///
    /// # Returns
    ///
    /// A `Result` containing the stored `Message`.
    pub fn send_message(
        &self,
        session_id: &str,
        sender: &str,
        recipient: &str,
        body: &str,
        now: DateTime<Utc>,
    ) -> Result<Message> {
        if session_id.is_empty() || sender.is_empty() || recipient.is_empty() || body.is_empty() {
            return Err(AppError::MissingFields("Missing required fields"));
        }

        let mut inner = self.lock();

        let session_user = inner.session_username(session_id, now)?;
        if session_user != sender {
            return Err(AppError::SenderMismatch);
        }

        if !inner.users.contains_key(recipient) {
            return Err(AppError::RecipientUnknown);
        }

        let message = Message {
            sender: sender.to_string(),
            body: body.to_string(),
            sent_at: now,
        };

        let queue = inner.messages.entry(recipient.to_string()).or_default();
        push_capped(queue, message.clone(), self.queue_cap);

        tracing::info!("✅ Message queued from {} to {}", sender, recipient);

        Ok(message)
    }

    /// Returns the accumulated message queue for the session's user.
    ///
    /// The read is non-destructive unless the registry was configured with
    /// trim-on-read, in which case the queue is drained.
    pub fn get_messages(&self, session_id: &str, now: DateTime<Utc>) -> Result<Vec<Message>> {
        if session_id.is_empty() {
            return Err(AppError::MissingFields("Session ID required"));
        }

        let mut inner = self.lock();
        let username = inner.session_username(session_id, now)?;

        let queue = inner.messages.entry(username.clone()).or_default();
        let messages: Vec<Message> = if self.trim_on_read {
            queue.drain(..).collect()
        } else {
            queue.iter().cloned().collect()
        };

        tracing::info!("✅ Retrieved {} messages for {}", messages.len(), username);

        Ok(messages)
    }

    /// Validates that `session_id` is a live session for `username`.
    ///
    /// Run before the relay call so an invalid request never reaches the
    /// upstream service.
    pub fn authorize_ai(
        &self,
        session_id: &str,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if session_id.is_empty() || username.is_empty() {
            return Err(AppError::MissingFields(
                "Session ID, username, and question required",
            ));
        }

        let inner = self.lock();
        let session_user = inner.session_username(session_id, now)?;
        if session_user != username {
            return Err(AppError::UserMismatch);
        }

        Ok(())
    }

    /// Appends an AI answer to the user's queue.
    ///
    /// Called unconditionally after the relay resolves: sentinel error
    /// answers are stored exactly like legitimate ones.
    pub fn record_ai_response(
        &self,
        username: &str,
        question: &str,
        answer: &str,
        now: DateTime<Utc>,
    ) -> AiResponse {
        let response = AiResponse {
            question: question.to_string(),
            answer: answer.to_string(),
            answered_at: now,
        };

        let mut inner = self.lock();
        let queue = inner.ai_responses.entry(username.to_string()).or_default();
        push_capped(queue, response.clone(), self.queue_cap);

        tracing::info!("✅ AI response recorded for {}", username);

        response
    }

    /// Returns the most recently recorded AI response for the session's
    /// user, or `None` when the queue is empty.
    pub fn latest_ai_response(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AiResponse>> {
        if session_id.is_empty() {
            return Err(AppError::MissingFields("Session ID required"));
        }

        let inner = self.lock();
        let username = inner.session_username(session_id, now)?;

        Ok(inner
            .ai_responses
            .get(&username)
            .and_then(|queue| queue.back())
            .cloned())
    }

    /// Removes every session whose expiry is at or before `now`.
    ///
    /// # Returns
    ///
    /// The number of sessions removed.
    pub fn expire_sessions(&self, now: DateTime<Utc>) -> usize {
        let mut inner = self.lock();
        let before = inner.sessions.len();
        inner.sessions.retain(|_, session| session.expires_at > now);
        let removed = before - inner.sessions.len();

        if removed > 0 {
            tracing::info!("🧹 Cleaned up {} expired session(s)", removed);
        }

        removed
    }

    /// Returns aggregate counters, with session validity judged at `now`.
    pub fn stats(&self, now: DateTime<Utc>) -> RegistryStats {
        let inner = self.lock();
        RegistryStats {
            users: inner.users.len(),
            active_sessions: inner
                .sessions
                .values()
                .filter(|s| s.is_valid_at(now))
                .count(),
            total_messages: inner.messages.values().map(VecDeque::len).sum(),
        }
    }

    /// Returns every registered username.
    pub fn usernames(&self) -> Vec<String> {
        let inner = self.lock();
        let mut names: Vec<String> = inner.users.keys().cloned().collect();
        names.sort();
        names
    }
}
