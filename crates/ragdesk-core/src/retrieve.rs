//! Weighted fusion of vector and keyword result lists.
//!
//! # Algorithm
//!
//! 1. Min-max normalize each list's raw scores to `[0, 1]`.
//! 2. Merge by chunk ordinal:
//!    `score = vector_weight × v + keyword_weight × k`, with a missing
//!    side contributing `0` (a chunk present in only one list keeps
//!    that list's score scaled by its weight).
//! 3. Sort by fused score (desc), ties by insertion ordinal (asc).
//!
//! With weights `(1, 0)` the output ordering reduces to the vector
//! ranking, and `(0, 1)` to the keyword ranking. A zero-weighted list
//! still contributes membership: its exclusive chunks stay in the
//! output at score `0` and trail everything the weighted list scored.

use std::collections::HashMap;

use crate::models::ScoredChunk;

/// Blend weights for the two retrieval lists. Defaults to 0.5/0.5.
#[derive(Debug, Clone, Copy)]
pub struct FusionWeights {
    pub vector: f32,
    pub keyword: f32,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            vector: 0.5,
            keyword: 0.5,
        }
    }
}

/// Merge two ranked candidate lists into one by weighted linear blend
/// of normalized scores.
pub fn fuse(
    vector_hits: Vec<ScoredChunk>,
    keyword_hits: Vec<ScoredChunk>,
    weights: FusionWeights,
) -> Vec<ScoredChunk> {
    let vector_norm = normalize_scores(&vector_hits);
    let keyword_norm = normalize_scores(&keyword_hits);

    let mut fused: HashMap<usize, ScoredChunk> = HashMap::new();

    for (hit, norm) in vector_hits.into_iter().zip(vector_norm) {
        fused.insert(
            hit.ord,
            ScoredChunk {
                score: weights.vector * norm,
                ..hit
            },
        );
    }
    for (hit, norm) in keyword_hits.into_iter().zip(keyword_norm) {
        fused
            .entry(hit.ord)
            .and_modify(|existing| existing.score += weights.keyword * norm)
            .or_insert(ScoredChunk {
                score: weights.keyword * norm,
                ..hit
            });
    }

    let mut merged: Vec<ScoredChunk> = fused.into_values().collect();
    merged.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.ord.cmp(&b.ord))
    });
    for (rank, hit) in merged.iter_mut().enumerate() {
        hit.rank = rank;
    }
    merged
}

/// Min-max normalize raw scores to `[0, 1]`. All-equal scores
/// normalize to `1.0`.
fn normalize_scores(hits: &[ScoredChunk]) -> Vec<f32> {
    if hits.is_empty() {
        return Vec::new();
    }
    let min = hits.iter().map(|h| h.score).fold(f32::INFINITY, f32::min);
    let max = hits
        .iter()
        .map(|h| h.score)
        .fold(f32::NEG_INFINITY, f32::max);
    hits.iter()
        .map(|h| {
            if (max - min).abs() < f32::EPSILON {
                1.0
            } else {
                (h.score - min) / (max - min)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::Chunk;

    fn hit(ord: usize, score: f32) -> ScoredChunk {
        ScoredChunk {
            chunk: Arc::new(Chunk {
                text: format!("chunk {}", ord),
                source: "doc.txt".to_string(),
                page: None,
            }),
            ord,
            score,
            rank: 0,
        }
    }

    fn ordering(hits: &[ScoredChunk]) -> Vec<usize> {
        hits.iter().map(|h| h.ord).collect()
    }

    #[test]
    fn normalize_maps_to_unit_range() {
        let hits = vec![hit(0, 10.0), hit(1, 5.0), hit(2, 0.0)];
        let norm = normalize_scores(&hits);
        assert!((norm[0] - 1.0).abs() < 1e-6);
        assert!((norm[1] - 0.5).abs() < 1e-6);
        assert!(norm[2].abs() < 1e-6);
    }

    #[test]
    fn normalize_all_equal_is_one() {
        let hits = vec![hit(0, 3.0), hit(1, 3.0)];
        for n in normalize_scores(&hits) {
            assert!((n - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn vector_weight_one_reduces_to_vector_ranking() {
        let vector = vec![hit(0, 0.9), hit(1, 0.5), hit(2, 0.1)];
        let keyword = vec![hit(2, 8.0), hit(0, 1.0)];
        let fused = fuse(
            vector,
            keyword,
            FusionWeights {
                vector: 1.0,
                keyword: 0.0,
            },
        );
        // Chunk 2's keyword-only entry contributes zero, so it sorts last.
        assert_eq!(ordering(&fused), vec![0, 1, 2]);
    }

    #[test]
    fn keyword_weight_one_reduces_to_keyword_ranking() {
        let vector = vec![hit(0, 0.9), hit(1, 0.5)];
        let keyword = vec![hit(1, 8.0), hit(2, 4.0), hit(0, 1.0)];
        let fused = fuse(
            vector,
            keyword,
            FusionWeights {
                vector: 0.0,
                keyword: 1.0,
            },
        );
        assert_eq!(ordering(&fused), vec![1, 2, 0]);
    }

    #[test]
    fn single_list_membership_keeps_weighted_score() {
        let vector = vec![hit(0, 1.0)];
        let keyword = vec![hit(1, 1.0)];
        let fused = fuse(vector, keyword, FusionWeights::default());
        assert_eq!(fused.len(), 2);
        for f in &fused {
            assert!((f.score - 0.5).abs() < 1e-6);
        }
        // Equal fused scores: insertion ordinal breaks the tie.
        assert_eq!(ordering(&fused), vec![0, 1]);
    }

    #[test]
    fn chunks_in_both_lists_blend() {
        let vector = vec![hit(0, 1.0), hit(1, 0.0)];
        let keyword = vec![hit(1, 10.0), hit(0, 2.0)];
        let fused = fuse(vector, keyword, FusionWeights::default());
        // ord 0: 0.5×1.0 + 0.5×0.0 = 0.5; ord 1: 0.5×0.0 + 0.5×1.0 = 0.5
        assert_eq!(fused.len(), 2);
        assert_eq!(ordering(&fused), vec![0, 1]);
    }

    #[test]
    fn ranks_are_contiguous_from_zero() {
        let fused = fuse(
            vec![hit(3, 0.2), hit(1, 0.9)],
            vec![hit(2, 5.0)],
            FusionWeights::default(),
        );
        for (i, f) in fused.iter().enumerate() {
            assert_eq!(f.rank, i);
        }
    }

    #[test]
    fn empty_keyword_list_is_vector_only() {
        let vector = vec![hit(0, 0.9), hit(1, 0.5)];
        let fused = fuse(vector, Vec::new(), FusionWeights::default());
        assert_eq!(ordering(&fused), vec![0, 1]);
    }
}
