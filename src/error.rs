use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// One or more required fields are missing or empty.
    #[error("{0}")]
    MissingFields(&'static str),

    /// The requested username already exists.
    #[error("Username already exists")]
    UsernameTaken,

    /// The username is shorter than the minimum length.
    #[error("Username must be at least 3 characters")]
    UsernameTooShort,

    /// The password is shorter than the minimum length.
    #[error("Password must be at least 4 characters")]
    PasswordTooShort,

    /// The username/password pair did not match a known user.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The session id is unknown or the session has expired.
    #[error("Invalid or expired session")]
    InvalidSession,

    /// The claimed sender is not the session's user.
    #[error("Session user mismatch")]
    SenderMismatch,

    /// The claimed username is not the session's user.
    #[error("Session user mismatch")]
    UserMismatch,

    /// The message recipient does not exist.
    #[error("Recipient not found")]
    RecipientUnknown,

    /// A validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();

        let status = match self {
            AppError::MissingFields(_)
            | AppError::UsernameTaken
            | AppError::UsernameTooShort
            | AppError::PasswordTooShort => {
                tracing::debug!("Validation error: {}", message);
                StatusCode::BAD_REQUEST
            }

            AppError::InvalidCredentials
            | AppError::InvalidSession
            | AppError::SenderMismatch
            | AppError::UserMismatch => {
                tracing::warn!("Authentication failed: {}", message);
                StatusCode::UNAUTHORIZED
            }

            AppError::RecipientUnknown => {
                tracing::debug!("Recipient not found");
                StatusCode::NOT_FOUND
            }

            AppError::Validation(ref msg) => {
                tracing::debug!("Validation error: {}", msg);
                StatusCode::BAD_REQUEST
            }

            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = sonic_rs::to_string(&sonic_rs::json!({
            "error": message
        }))
        .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());

        (status, body).into_response()
    }
}
