use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// The fixed session lifetime in seconds.
pub const SESSION_TTL_SECS: i64 = 86_400;

/// Represents a user session.
///
/// Sessions are immutable once created: `expires_at` is always
/// `created_at + SESSION_TTL_SECS` and there is no renewal.
#[derive(Debug, Clone)]
pub struct Session {
    /// The opaque session token.
    pub id: Uuid,
    /// The username this session authenticates.
    pub username: String,
    /// The timestamp when the session was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the session expires.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Creates a new session for `username` starting at `now`.
    pub fn new(username: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            created_at: now,
            expires_at: now + Duration::seconds(SESSION_TTL_SECS),
        }
    }

    /// Returns whether the session is valid at `instant`.
    ///
    /// A session is valid exactly on `created_at <= instant < expires_at`;
    /// at `created_at + SESSION_TTL_SECS` it is already invalid.
    pub fn is_valid_at(&self, instant: DateTime<Utc>) -> bool {
        self.created_at <= instant && instant < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_valid_inside_window() {
        let now = Utc::now();
        let session = Session::new("alice", now);
        assert!(session.is_valid_at(now));
        assert!(session.is_valid_at(now + Duration::seconds(SESSION_TTL_SECS - 1)));
    }

    #[test]
    fn session_invalid_at_exact_expiry() {
        let now = Utc::now();
        let session = Session::new("alice", now);
        assert!(!session.is_valid_at(now + Duration::seconds(SESSION_TTL_SECS)));
    }

    #[test]
    fn session_invalid_before_creation() {
        let now = Utc::now();
        let session = Session::new("alice", now);
        assert!(!session.is_valid_at(now - Duration::seconds(1)));
    }
}
