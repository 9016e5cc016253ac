use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// The sentinel answer for an upstream that responded with a non-200 status
/// (or was never configured).
pub const ERR_SERVICE_UNAVAILABLE: &str = "ERROR: AI SERVICE UNAVAILABLE";

/// The sentinel answer for a transport failure or timeout.
pub const ERR_REQUEST_FAILED: &str = "ERROR: AI REQUEST FAILED";

/// The upper bound on a relayed answer, matching the device slot capacity.
const MAX_ANSWER_CHARS: usize = 2000;

#[derive(Serialize)]
struct RelayRequest<'a> {
    question: &'a str,
    instructions: &'static str,
}

#[derive(Deserialize)]
struct RelayResponse {
    #[serde(default)]
    answer: String,
}

/// A client for the external question-answering service.
///
/// Every failure mode degrades to a sentinel answer string, so callers
/// store and return the result uniformly and never observe an error.
#[derive(Clone)]
pub struct AiRelay {
    http: reqwest::Client,
    endpoint: Option<String>,
}

impl AiRelay {
    /// Creates a new relay client.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - The upstream URL, or `None` when unconfigured.
    /// * `timeout` - The per-request timeout.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AiRelay`.
    pub fn new(endpoint: Option<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("HTTP client build failed: {}", e)))?;

        Ok(Self { http, endpoint })
    }

    /// Forwards a question upstream and normalizes the outcome.
    ///
    /// # Arguments
    ///
    /// * `question` - The question to forward.
    ///
    /// # Returns
    ///
    /// The upper-cased, length-bounded answer, or an error sentinel.
    pub async fn ask(&self, question: &str) -> String {
        let Some(endpoint) = &self.endpoint else {
            tracing::warn!("❌ AI relay not configured, returning sentinel");
            return ERR_SERVICE_UNAVAILABLE.to_string();
        };

        let payload = RelayRequest {
            question,
            instructions: "Answer in one or two short sentences.",
        };

        let response = match self.http.post(endpoint).json(&payload).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("❌ AI relay request failed: {}", e);
                return ERR_REQUEST_FAILED.to_string();
            }
        };

        if !response.status().is_success() {
            tracing::warn!("❌ AI relay returned HTTP {}", response.status());
            return ERR_SERVICE_UNAVAILABLE.to_string();
        }

        match response.json::<RelayResponse>().await {
            Ok(body) => {
                let mut answer = body.answer.trim().to_uppercase();
                if let Some((cut, _)) = answer.char_indices().nth(MAX_ANSWER_CHARS) {
                    answer.truncate(cut);
                }
                answer
            }
            Err(e) => {
                tracing::error!("❌ AI relay response decode failed: {}", e);
                ERR_REQUEST_FAILED.to_string()
            }
        }
    }
}
