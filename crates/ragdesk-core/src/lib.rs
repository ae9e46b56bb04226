//! # Ragdesk Core
//!
//! Shared retrieval logic for Ragdesk: data models, error taxonomy,
//! chunking, the vector and keyword indices, weighted rank fusion,
//! cross-encoder reranking, and per-session conversation state.
//!
//! This crate contains no HTTP surface and no model inference. Anything
//! that talks to an embedding or LLM service lives in the `ragdesk`
//! application crate and reaches back in through the
//! [`rerank::RelevanceScorer`] call contract.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | Core data types |
//! | [`error`] | Tagged error taxonomy |
//! | [`chunk`] | Overlapping text chunking |
//! | [`index`] | Vector and keyword (BM25) indices |
//! | [`retrieve`] | Weighted fusion of ranked result lists |
//! | [`rerank`] | Second-stage pairwise reranking |
//! | [`session`] | Conversation store |

pub mod chunk;
pub mod error;
pub mod index;
pub mod models;
pub mod rerank;
pub mod retrieve;
pub mod session;
