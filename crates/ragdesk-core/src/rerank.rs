//! Second-stage reranking over a bounded candidate set.
//!
//! The pairwise relevance model scores each (query, chunk-text) pair
//! jointly. It is strictly more accurate than the first-stage retrieval
//! score but more expensive, so it only ever sees the fused top
//! candidates. Model inference is behind the [`RelevanceScorer`] call
//! contract; this module owns the reordering and the tie-breaking that
//! make the result deterministic for identical
//! (query, candidate-set, model) triples.

use async_trait::async_trait;

use crate::error::{RagError, Result};
use crate::models::ScoredChunk;

/// Call contract for a cross-encoder style pairwise relevance model.
#[async_trait]
pub trait RelevanceScorer: Send + Sync {
    /// Score each text against `query` jointly. Returns one score per
    /// input text, in input order.
    async fn score_pairs(&self, query: &str, texts: &[String]) -> Result<Vec<f32>>;
}

/// Reorder `candidates` by pairwise relevance to `query` and keep the
/// top `top_n`.
///
/// The output is a permutation of a subset of the input: no chunk is
/// invented, duplicated, or rescored twice. Ties in model score fall
/// back to the candidate's first-stage rank, so the result is fully
/// deterministic.
pub async fn rerank<S: RelevanceScorer + ?Sized>(
    scorer: &S,
    query: &str,
    candidates: Vec<ScoredChunk>,
    top_n: usize,
) -> Result<Vec<ScoredChunk>> {
    if candidates.is_empty() || top_n == 0 {
        return Ok(Vec::new());
    }

    let texts: Vec<String> = candidates.iter().map(|c| c.chunk.text.clone()).collect();
    let scores = scorer.score_pairs(query, &texts).await?;
    if scores.len() != candidates.len() {
        return Err(RagError::upstream(format!(
            "reranker returned {} scores for {} candidates",
            scores.len(),
            candidates.len()
        )));
    }

    let mut rescored: Vec<ScoredChunk> = candidates
        .into_iter()
        .zip(scores)
        .map(|(c, score)| ScoredChunk { score, ..c })
        .collect();
    rescored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.rank.cmp(&b.rank))
    });
    rescored.truncate(top_n);
    for (rank, hit) in rescored.iter_mut().enumerate() {
        hit.rank = rank;
    }
    Ok(rescored)
}
