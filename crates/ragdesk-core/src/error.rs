//! Tagged error taxonomy for the retrieval pipeline.
//!
//! The variants separate caller mistakes from upstream model failures so
//! that the HTTP layer and logs can distinguish retryable from terminal
//! conditions. Every variant carries a human-readable detail string; the
//! application decides what is returned versus what is only logged.

use thiserror::Error;

/// Errors raised by the ingestion and chat pipelines.
#[derive(Debug, Error)]
pub enum RagError {
    /// Invalid caller input: unsupported file type, empty extracted
    /// text, malformed request. Maps to HTTP 400; never retried.
    #[error("{0}")]
    Validation(String),

    /// The knowledge base holds no documents yet. Maps to HTTP 404.
    #[error("{0}")]
    EmptyIndex(String),

    /// An embedding, generation, or rerank call failed. Maps to
    /// HTTP 500. Not retried here; retry policy, if any, belongs to
    /// the model client.
    #[error("upstream model call failed: {0}")]
    Upstream(String),

    /// Anything else: snapshot I/O, serialization, internal invariant
    /// violations. Maps to HTTP 500.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RagError {
    pub fn validation(msg: impl Into<String>) -> Self {
        RagError::Validation(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        RagError::Upstream(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        RagError::Internal(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, RagError>;
