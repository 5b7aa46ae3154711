//! Error types for the chat completions client.

use handbook_pipeline::OracleError;
use thiserror::Error;

/// Errors that can occur while talking to the provider.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Connection, TLS or body transfer failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered 429.
    #[error("Rate limited by provider: {0}")]
    RateLimited(String),

    /// Any other non-success status.
    #[error("Provider returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The provider reported an error inside an already started stream.
    #[error("Provider aborted the stream: {0}")]
    Stream(String),

    /// Response parsed but did not have the expected shape.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl From<LlmError> for OracleError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Http(e) => OracleError::Transport(e.to_string()),
            LlmError::RateLimited(message) => OracleError::RateLimited(message),
            LlmError::Api { status, message } => {
                OracleError::Transport(format!("HTTP {status}: {message}"))
            }
            LlmError::Stream(message) => OracleError::Transport(message),
            LlmError::Json(e) => OracleError::Malformed(e.to_string()),
            LlmError::Malformed(message) => OracleError::Malformed(message),
        }
    }
}
