//! Dense vector index: brute-force cosine similarity over chunk
//! embeddings, with optional source filtering and JSON snapshots.
//!
//! Embeddings are precomputed by the caller; the index never talks to a
//! model. Appends are intentionally duplicate-friendly: re-uploading
//! identical text creates duplicate entries, because re-upload is a
//! user action. Ties in similarity are broken by insertion ordinal
//! (earlier wins).

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};
use crate::models::{Chunk, ScoredChunk};

/// Snapshot file name within the snapshot directory.
const SNAPSHOT_FILE: &str = "index.json";

#[derive(Debug, Clone)]
struct IndexedChunk {
    chunk: Arc<Chunk>,
    embedding: Vec<f32>,
}

/// In-memory similarity index over chunk embeddings.
#[derive(Debug, Default)]
pub struct VectorIndex {
    entries: Vec<IndexedChunk>,
}

/// Serialized form of the index, round-tripped through the snapshot.
#[derive(Serialize, Deserialize)]
struct Snapshot {
    entries: Vec<SnapshotEntry>,
}

#[derive(Serialize, Deserialize)]
struct SnapshotEntry {
    chunk: Chunk,
    embedding: Vec<f32>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append chunks with their precomputed embeddings.
    ///
    /// Errors when the two slices differ in length or an embedding's
    /// dimensionality disagrees with what the index already holds.
    pub fn add(&mut self, chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> Result<()> {
        if chunks.len() != embeddings.len() {
            return Err(RagError::internal(format!(
                "chunk/embedding count mismatch: {} chunks, {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }
        let dims = self.entries.first().map(|e| e.embedding.len());
        for (chunk, embedding) in chunks.into_iter().zip(embeddings) {
            if let Some(d) = dims {
                if embedding.len() != d {
                    return Err(RagError::internal(format!(
                        "embedding dimensionality mismatch: index has {}, got {}",
                        d,
                        embedding.len()
                    )));
                }
            }
            self.entries.push(IndexedChunk {
                chunk: Arc::new(chunk),
                embedding,
            });
        }
        Ok(())
    }

    /// Return the `k` most similar chunks to `query`, optionally
    /// restricted to one source before ranking.
    pub fn search(&self, query: &[f32], k: usize, filter: Option<&str>) -> Vec<ScoredChunk> {
        let mut hits: Vec<ScoredChunk> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| filter.map_or(true, |src| e.chunk.source == src))
            .map(|(ord, e)| ScoredChunk {
                chunk: e.chunk.clone(),
                ord,
                score: cosine_similarity(query, &e.embedding),
                rank: 0,
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

    /// Deduplicated, lexicographically sorted source names.
    pub fn sources(&self) -> Vec<String> {
        let unique: BTreeSet<&str> = self
            .entries
            .iter()
            .map(|e| e.chunk.source.as_str())
            .collect();
        unique.into_iter().map(str::to_string).collect()
    }

    /// The full chunk set with insertion ordinals, for keyword rebuild.
    pub fn all_chunks(&self) -> Vec<(usize, Arc<Chunk>)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(ord, e)| (ord, e.chunk.clone()))
            .collect()
    }

    /// Serialize the full index for a snapshot.
    ///
    /// Split from [`VectorIndex::write_snapshot`] so callers can
    /// serialize under a lock and hand the write to a blocking task.
    pub fn snapshot_bytes(&self) -> Result<Vec<u8>> {
        let snapshot = Snapshot {
            entries: self
                .entries
                .iter()
                .map(|e| SnapshotEntry {
                    chunk: (*e.chunk).clone(),
                    embedding: e.embedding.clone(),
                })
                .collect(),
        };
        serde_json::to_vec(&snapshot)
            .map_err(|e| RagError::internal(format!("serialize snapshot: {}", e)))
    }

    /// Write serialized snapshot bytes into `dir` (created if absent).
    pub fn write_snapshot(dir: &Path, bytes: &[u8]) -> Result<()> {
        std::fs::create_dir_all(dir)
            .map_err(|e| RagError::internal(format!("create snapshot dir: {}", e)))?;
        std::fs::write(dir.join(SNAPSHOT_FILE), bytes)
            .map_err(|e| RagError::internal(format!("write snapshot: {}", e)))?;
        Ok(())
    }

    /// Serialize the full index into `dir` (created if absent).
    pub fn snapshot(&self, dir: &Path) -> Result<()> {
        Self::write_snapshot(dir, &self.snapshot_bytes()?)
    }

    /// Load an index from a snapshot directory.
    ///
    /// Errors for an absent or corrupt snapshot; callers treat that as
    /// non-fatal and start with an empty index.
    pub fn restore(dir: &Path) -> Result<Self> {
        let path = dir.join(SNAPSHOT_FILE);
        let bytes = std::fs::read(&path)
            .map_err(|e| RagError::internal(format!("read snapshot {}: {}", path.display(), e)))?;
        let snapshot: Snapshot = serde_json::from_slice(&bytes)
            .map_err(|e| RagError::internal(format!("corrupt snapshot {}: {}", path.display(), e)))?;
        Ok(Self {
            entries: snapshot
                .entries
                .into_iter()
                .map(|e| IndexedChunk {
                    chunk: Arc::new(e.chunk),
                    embedding: e.embedding,
                })
                .collect(),
        })
    }
}

/// Cosine similarity between two embedding vectors.
///
/// Returns `0.0` for empty vectors or vectors of different lengths.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }
    dot / denom
}
