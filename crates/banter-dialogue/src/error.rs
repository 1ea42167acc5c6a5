//! Dialogue error types.

use thiserror::Error;

/// Result type for dialogue operations.
pub type DialogueResult<T> = Result<T, DialogueError>;

/// Errors that can occur while talking to the AI providers.
#[derive(Debug, Error)]
pub enum DialogueError {
    #[error("{0} not configured")]
    MissingApiKey(&'static str),

    #[error("Provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Malformed conversation response: {0}")]
    MalformedConversation(String),

    #[error("Speech synthesis failed: {0}")]
    SynthesisFailed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DialogueError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedConversation(msg.into())
    }

    pub fn synthesis_failed(msg: impl Into<String>) -> Self {
        Self::SynthesisFailed(msg.into())
    }
}
