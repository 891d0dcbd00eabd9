// crates/backend-lib/src/error.rs

//! Central error type.
use thiserror::Error;

/// Application error types with stable error codes
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Username and room are required")]
    MissingField,

    #[error("Username is in use")]
    DuplicateUser,

    #[error("Content not allowed")]
    ContentRejected,

    #[error("No user for this connection")]
    UnknownUser,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Get the stable error code for this error, sent on the wire
    pub fn code(&self) -> &'static str {
        match self {
            AppError::MissingField => "MISSING_FIELD",
            AppError::DuplicateUser => "DUPLICATE_USER",
            AppError::ContentRejected => "CONTENT_REJECTED",
            AppError::UnknownUser => "UNKNOWN_USER",
            AppError::Internal(_) => "INTERNAL",
            AppError::Io(_) => "IO",
            AppError::Json(_) => "JSON",
        }
    }

    /// Whether this error is the programming-bug class that force-disconnects
    /// the offending connection. Everything else is recoverable and
    /// connection-local.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AppError::Internal(_) | AppError::Io(_) | AppError::Json(_)
        )
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for AppError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        AppError::Internal("Failed to send message".to_string())
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}
