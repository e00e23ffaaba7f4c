//! Error types for gelato-core

use thiserror::Error;

/// Result type alias using gelato-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gelato-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// A required field was missing before any network call was made
    #[error("Validation error: {0}")]
    Validation(String),

    /// The remote store was unreachable or answered with a server error
    #[error("Transport error: {0}")]
    Transport(String),

    /// The requested entry does not exist
    #[error("Entry not found: {0}")]
    NotFound(String),

    /// The operation requires elevated privilege
    #[error("Permission denied: {0}")]
    Permission(String),

    /// A server-held secret or setting is missing
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error should trigger the local fallback paths.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Transport(format!("request timed out: {error}"))
        } else {
            Self::Transport(error.to_string())
        }
    }
}
