//! Core data models that flow through the retrieval pipeline.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A bounded contiguous span of a document's text — the unit of
/// indexing and retrieval.
///
/// Chunks are immutable once created; the vector index holds ownership
/// and every other component sees them through `Arc`. They serialize
/// as-is into the snapshot file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk text, including the overlap prefix carried from the
    /// previous chunk of the same page/source.
    pub text: String,
    /// Source document name (unique per upload).
    pub source: String,
    /// 1-based page number, when the extractor reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl Chunk {
    /// Citation string returned to callers: `"<source>"` or
    /// `"<source> (Page <n>)"`.
    pub fn citation(&self) -> String {
        match self.page {
            Some(p) => format!("{} (Page {})", self.source, p),
            None => self.source.clone(),
        }
    }
}

/// A chunk paired with a retrieval score and rank.
///
/// Produced transiently by the retrieval and reranking stages; never
/// persisted. `ord` is the index-wide insertion ordinal, used for
/// deterministic tie-breaking (earlier insertion wins).
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Arc<Chunk>,
    pub ord: usize,
    pub score: f32,
    pub rank: usize,
}

/// One question/answer exchange within a session. Immutable once
/// appended; the timestamp is implicit in the turn order.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub question: String,
    pub answer: String,
}
