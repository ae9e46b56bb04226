//! Sparse BM25 keyword index over chunk text.
//!
//! The index has no incremental update: [`KeywordIndex::rebuild`]
//! recomputes all term statistics from the full chunk set and is called
//! after every ingestion. That is a deliberate simplicity-over-
//! throughput choice and a known scaling limit for large corpora.
//!
//! Unlike the vector index there is no metadata filter here; scoped
//! (single-document) queries bypass the keyword index entirely.

use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{Chunk, ScoredChunk};

/// Term-frequency saturation parameter (standard BM25 default).
const K1: f32 = 1.5;
/// Length-normalization parameter (standard BM25 default).
const B: f32 = 0.75;

struct KeywordDoc {
    ord: usize,
    chunk: Arc<Chunk>,
    term_freqs: HashMap<String, u32>,
    len: u32,
}

/// BM25-style keyword index, rebuilt wholesale from the chunk set.
#[derive(Default)]
pub struct KeywordIndex {
    docs: Vec<KeywordDoc>,
    doc_freqs: HashMap<String, u32>,
    avg_len: f32,
}

impl KeywordIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Recompute all term statistics from the full current chunk set.
    ///
    /// O(total chunk text). Idempotent: rebuilding from the same chunk
    /// set yields identical search results for any fixed query.
    pub fn rebuild(all_chunks: &[(usize, Arc<Chunk>)]) -> Self {
        let mut docs = Vec::with_capacity(all_chunks.len());
        let mut doc_freqs: HashMap<String, u32> = HashMap::new();
        let mut total_len: u64 = 0;

        for (ord, chunk) in all_chunks {
            let tokens = tokenize(&chunk.text);
            let mut term_freqs: HashMap<String, u32> = HashMap::new();
            for token in &tokens {
                *term_freqs.entry(token.clone()).or_insert(0) += 1;
            }
            for term in term_freqs.keys() {
                *doc_freqs.entry(term.clone()).or_insert(0) += 1;
            }
            total_len += tokens.len() as u64;
            docs.push(KeywordDoc {
                ord: *ord,
                chunk: chunk.clone(),
                len: tokens.len() as u32,
                term_freqs,
            });
        }

        let avg_len = if docs.is_empty() {
            0.0
        } else {
            total_len as f32 / docs.len() as f32
        };

        Self {
            docs,
            doc_freqs,
            avg_len,
        }
    }

    /// Top-`k` chunks by BM25 score for `query`.
    ///
    /// Chunks that match no query term are excluded. Ties are broken by
    /// insertion ordinal (earlier wins).
    pub fn search(&self, query: &str, k: usize) -> Vec<ScoredChunk> {
        let mut terms = tokenize(query);
        terms.sort();
        terms.dedup();
        if terms.is_empty() || self.docs.is_empty() {
            return Vec::new();
        }

        let n = self.docs.len() as f32;
        let mut hits: Vec<ScoredChunk> = self
            .docs
            .iter()
            .filter_map(|doc| {
                let mut score = 0.0f32;
                for term in &terms {
                    let tf = match doc.term_freqs.get(term) {
                        Some(tf) => *tf as f32,
                        None => continue,
                    };
                    let df = self.doc_freqs.get(term).copied().unwrap_or(0) as f32;
                    let idf = (1.0 + (n - df + 0.5) / (df + 0.5)).ln();
                    let norm = K1 * (1.0 - B + B * doc.len as f32 / self.avg_len.max(1e-6));
                    score += idf * tf * (K1 + 1.0) / (tf + norm);
                }
                if score > 0.0 {
                    Some(ScoredChunk {
                        chunk: doc.chunk.clone(),
                        ord: doc.ord,
                        score,
                        rank: 0,
                    })
                } else {
                    None
                }
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.ord.cmp(&b.ord))
        });
        hits.truncate(k);
        for (rank, hit) in hits.iter_mut().enumerate() {
            hit.rank = rank;
        }
        hits
    }
}

/// Lowercased alphanumeric tokens.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}
