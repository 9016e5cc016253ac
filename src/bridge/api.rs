use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bridge::dispatch::AuthKind;
use crate::config::BridgeConfig;

/// An error talking to the relay server.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never completed: connection refused, DNS, timeout.
    #[error("server connection error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with an error response.
    #[error("{message} (HTTP {status})")]
    Server { status: u16, message: String },
}

impl ApiError {
    /// Whether the request reached the server at all.
    ///
    /// Transport failures leave the request slot staged so the next tick
    /// retries; server rejections consume it.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

#[derive(Serialize)]
struct AuthBody<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SendMessageBody<'a> {
    session_id: &'a str,
    sender: &'a str,
    recipient: &'a str,
    message: &'a str,
}

#[derive(Serialize)]
struct AiQuestionBody<'a> {
    session_id: &'a str,
    username: &'a str,
    question: &'a str,
}

#[derive(Deserialize)]
struct AuthReply {
    #[serde(default)]
    session_id: String,
}

/// One entry of a `/get_messages` reply.
#[derive(Deserialize, Debug, Clone)]
pub struct MessageEntry {
    pub sender: String,
    pub message: String,
}

#[derive(Deserialize)]
struct MessagesReply {
    #[serde(default)]
    messages: Vec<MessageEntry>,
}

#[derive(Deserialize)]
struct AiReply {
    #[serde(default)]
    answer: String,
}

#[derive(Deserialize)]
struct ErrorReply {
    #[serde(default)]
    error: String,
}

/// A typed client for the relay server's endpoints.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a new `ApiClient` from the bridge configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `ApiClient`.
    pub fn new(config: &BridgeConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.server_url.clone(),
        })
    }

    async fn server_error(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let message = match response.json::<ErrorReply>().await {
            Ok(reply) if !reply.error.is_empty() => reply.error,
            _ => format!("HTTP {}", status),
        };
        ApiError::Server { status, message }
    }

    /// Runs a signup or login request.
    ///
    /// # Returns
    ///
    /// A `Result` containing the new session id.
    pub async fn authenticate(
        &self,
        kind: AuthKind,
        username: &str,
        password: &str,
    ) -> Result<String, ApiError> {
        let endpoint = match kind {
            AuthKind::Login => "/login",
            AuthKind::Signup => "/signup",
        };

        let response = self
            .http
            .post(format!("{}{}", self.base_url, endpoint))
            .json(&AuthBody { username, password })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }

        let reply: AuthReply = response.json().await?;
        Ok(reply.session_id)
    }

    /// Sends a message on behalf of the authenticated sender.
    pub async fn send_message(
        &self,
        session_id: &str,
        sender: &str,
        recipient: &str,
        body: &str,
    ) -> Result<(), ApiError> {
        let response = self
            .http
            .post(format!("{}/send_message", self.base_url))
            .json(&SendMessageBody {
                session_id,
                sender,
                recipient,
                message: body,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }

        Ok(())
    }

    /// Retrieves the accumulated messages for the session's user.
    pub async fn get_messages(&self, session_id: &str) -> Result<Vec<MessageEntry>, ApiError> {
        let response = self
            .http
            .get(format!("{}/get_messages", self.base_url))
            .query(&[("session_id", session_id)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }

        let reply: MessagesReply = response.json().await?;
        Ok(reply.messages)
    }

    /// Forwards an AI question and returns the answer (sentinels included).
    pub async fn ask_ai(
        &self,
        session_id: &str,
        username: &str,
        question: &str,
    ) -> Result<String, ApiError> {
        let response = self
            .http
            .post(format!("{}/ai_question", self.base_url))
            .json(&AiQuestionBody {
                session_id,
                username,
                question,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }

        let reply: AiReply = response.json().await?;
        Ok(reply.answer)
    }
}
