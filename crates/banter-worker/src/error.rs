//! Pipeline error types.

use banter_store::StoreError;
use thiserror::Error;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors raised while running a job through the pipeline.
///
/// Stage variants carry a human-readable message; the orchestrator
/// records that message on the failed job, so it must stand on its own
/// without the surrounding log context.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Source acquisition failed: {0}")]
    Acquisition(String),

    #[error("Conversation generation failed: {0}")]
    Conversation(String),

    #[error("Speech synthesis failed: {0}")]
    Speech(String),

    #[error("Clip sampling failed: {0}")]
    Sampling(String),

    #[error("Assembly failed: {0}")]
    Assembly(String),

    #[error("Publication failed: {0}")]
    Publication(String),

    #[error("Job store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn acquisition(msg: impl Into<String>) -> Self {
        Self::Acquisition(msg.into())
    }

    pub fn conversation(msg: impl Into<String>) -> Self {
        Self::Conversation(msg.into())
    }

    pub fn speech(msg: impl Into<String>) -> Self {
        Self::Speech(msg.into())
    }

    pub fn sampling(msg: impl Into<String>) -> Self {
        Self::Sampling(msg.into())
    }

    pub fn assembly(msg: impl Into<String>) -> Self {
        Self::Assembly(msg.into())
    }

    pub fn publication(msg: impl Into<String>) -> Self {
        Self::Publication(msg.into())
    }
}
