//! Dual indices over the chunk set.
//!
//! The [`vector::VectorIndex`] owns the canonical chunk set; the
//! [`keyword::KeywordIndex`] is a derived, rebuildable view over the
//! same chunks. The two must never disagree on membership for longer
//! than one ingestion: every ingestion appends to the vector index and
//! then rebuilds the keyword index from `all_chunks()`.

pub mod keyword;
pub mod vector;
