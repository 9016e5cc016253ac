use chrono::{DateTime, Utc};

/// Represents a user in the registry.
///
/// Users are created once on signup and never deleted.
#[derive(Clone, Debug)]
pub struct User {
    /// The user's unique username.
    pub username: String,
    /// The hex-encoded one-way digest of the user's password.
    pub password_digest: String,
    /// The timestamp when the user was created.
    pub created_at: DateTime<Utc>,
}
