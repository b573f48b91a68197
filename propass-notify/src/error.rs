//! Notification error types.

use thiserror::Error;

/// Result type for notification operations.
pub type NotifyResult<T> = Result<T, NotifyError>;

/// Errors that can occur sending notifications.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("email provider rejected message: {0}")]
    Rejected(String),

    #[error("invalid notification configuration: {0}")]
    Config(String),
}
