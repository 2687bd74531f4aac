//! Error types for startup-copilot.

use thiserror::Error;

/// Result type alias using startup-copilot's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for startup-copilot operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing credentials, unknown model selector, unusable database, ...
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Inference/generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Trends provider failed
    #[error("Trends error: {0}")]
    Trends(String),

    /// Note store rejected or failed a call
    #[error("Note store error: {0}")]
    NoteStore(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns true for errors raised by an external collaborator
    /// (model endpoint, trends source, note store, network).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Inference(_) | Error::Trends(_) | Error::NoteStore(_) | Error::Request(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
