//! # Ragdesk
//!
//! A retrieval-augmented document Q&A service. Uploaded documents are
//! chunked and dual-indexed (dense vectors + BM25 keywords); questions
//! go through history-aware reformulation, weighted hybrid retrieval,
//! cross-encoder reranking, and an LLM answer synthesis step, with
//! per-session conversation state.
//!
//! ```text
//! upload ──▶ extract ──▶ chunk ──▶ embed ──▶ ┌──────────────┐
//!                                            │ vector index │──▶ snapshot
//!                                            │ keyword index│   (rebuilt)
//!                                            └──────┬───────┘
//!                                                   │
//! chat ──▶ history ──▶ reformulate ──▶ fuse/scope ──┴─▶ rerank ──▶ generate
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration |
//! | [`extract`] | Text extraction from uploaded files |
//! | [`model`] | LLM / embedding / reranker call contract |
//! | [`analysis`] | Per-document summary, action items, role |
//! | [`state`] | Process-wide application context |
//! | [`pipeline`] | Ingestion and chat orchestration |
//! | [`webhook`] | Fire-and-forget outbound notifications |
//! | [`server`] | HTTP surface |

pub mod analysis;
pub mod config;
pub mod extract;
pub mod model;
pub mod pipeline;
pub mod server;
pub mod state;
pub mod webhook;
