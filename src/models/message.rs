use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The timestamp format used in human-readable responses.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A message delivered to a recipient's queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// The authenticated sender.
    pub sender: String,
    /// The message body.
    #[serde(rename = "message")]
    pub body: String,
    /// The timestamp when the message was accepted, as epoch seconds.
    #[serde(rename = "timestamp", with = "chrono::serde::ts_seconds")]
    pub sent_at: DateTime<Utc>,
}

impl Message {
    /// Formats the acceptance timestamp for human-readable responses.
    pub fn formatted_time(&self) -> String {
        self.sent_at.format(TIME_FORMAT).to_string()
    }
}

/// An AI answer stored in the asking user's queue.
///
/// Relay failures are stored too: the sentinel error string takes the
/// place of the answer so retrieval is uniform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiResponse {
    /// The question that was forwarded upstream.
    pub question: String,
    /// The upstream answer, or an error sentinel.
    pub answer: String,
    /// The timestamp when the answer was recorded, as epoch seconds.
    #[serde(rename = "timestamp", with = "chrono::serde::ts_seconds")]
    pub answered_at: DateTime<Utc>,
}

impl AiResponse {
    /// Formats the recording timestamp for human-readable responses.
    pub fn formatted_time(&self) -> String {
        self.answered_at.format(TIME_FORMAT).to_string()
    }
}
