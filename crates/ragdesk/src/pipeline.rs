//! Ingestion and chat orchestration.
//!
//! Every chat request walks the same state machine:
//! receive → reformulate → retrieve → rerank → generate → persist turn
//! → respond with sources. The retrieve stage branches on request
//! shape: a scoped request (one target source) bypasses the fusion
//! retriever and queries the vector index directly with a metadata
//! filter and a larger k, because the keyword index cannot filter.
//!
//! Ingestion is the write path: extract → chunk → analysis (three
//! concurrent generation calls) → embed → vector append + snapshot →
//! keyword rebuild (built off-lock, swapped atomically) → webhooks.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{info, warn};

use ragdesk_core::chunk::chunk_text;
use ragdesk_core::error::{RagError, Result};
use ragdesk_core::index::keyword::KeywordIndex;
use ragdesk_core::index::vector::VectorIndex;
use ragdesk_core::models::{Chunk, ScoredChunk, Turn};
use ragdesk_core::rerank::rerank;
use ragdesk_core::retrieve::{fuse, FusionWeights};

use crate::analysis::{analyze, Analysis, ANALYSIS_CHUNKS};
use crate::extract::extract;
use crate::model::ModelClient;
use crate::state::AppContext;
use crate::webhook;

/// Chat result: the synthesized answer plus deduplicated, sorted
/// citations drawn from the final reranked chunk set.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub answer: String,
    pub sources: Vec<String>,
}

/// Ingest one uploaded file: analyze it and index its chunks.
pub async fn ingest_document(
    ctx: &Arc<AppContext>,
    filename: &str,
    bytes: &[u8],
) -> Result<Analysis> {
    let segments = extract(filename, bytes)?;

    let mut chunks: Vec<Chunk> = Vec::new();
    for segment in &segments {
        chunks.extend(chunk_text(
            &segment.text,
            filename,
            segment.page,
            ctx.config.chunking.chunk_size,
            ctx.config.chunking.overlap,
        )?);
    }

    let excerpt = chunks
        .iter()
        .take(ANALYSIS_CHUNKS)
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let analysis = analyze(ctx.model.as_ref(), &excerpt).await?;

    let chunk_count = chunks.len();

    // The index transaction runs on a detached task: a client
    // disconnect drops this handler future, and abandoning the
    // transaction between the vector append and the keyword swap would
    // leave the two indices disagreeing until the next upload.
    let task_ctx = ctx.clone();
    let total = tokio::spawn(async move {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = task_ctx.model.embed(&texts).await?;

        {
            // Append and snapshot under one write lock so the on-disk
            // snapshot never lags a visible in-memory state. The disk
            // write itself goes to a blocking thread.
            let mut vector = task_ctx.vector.write().await;
            vector.add(chunks, embeddings)?;
            let bytes = vector.snapshot_bytes()?;
            let dir = task_ctx.config.snapshot.dir.clone();
            tokio::task::spawn_blocking(move || VectorIndex::write_snapshot(&dir, &bytes))
                .await
                .map_err(|e| RagError::internal(format!("snapshot write task: {}", e)))??;
        }

        // Rebuild the keyword view off-lock and off-executor, then swap
        // it in atomically. Readers see the pre- or post-rebuild index,
        // never a partial one.
        let all_chunks = task_ctx.vector.read().await.all_chunks();
        let total = all_chunks.len();
        let rebuilt = tokio::task::spawn_blocking(move || KeywordIndex::rebuild(&all_chunks))
            .await
            .map_err(|e| RagError::internal(format!("keyword rebuild task: {}", e)))?;
        *task_ctx.keyword.write().await = rebuilt;
        Ok::<usize, RagError>(total)
    })
    .await
    .map_err(|e| RagError::internal(format!("ingestion task: {}", e)))??;

    info!(
        source = filename,
        chunks = chunk_count,
        total,
        "document ingested and indexed"
    );

    webhook::notify(ctx.config.webhooks.urls.clone(), analysis.clone());
    Ok(analysis)
}

/// Answer one question within a session.
pub async fn chat(
    ctx: &AppContext,
    query: &str,
    session_id: &str,
    filter_source: Option<&str>,
) -> Result<ChatOutcome> {
    if query.trim().is_empty() {
        return Err(RagError::validation("query must not be empty"));
    }
    if ctx.vector.read().await.is_empty() {
        return Err(RagError::EmptyIndex(
            "Knowledge base is empty. Please upload a document.".to_string(),
        ));
    }

    // Holding the session lock for the whole request serializes
    // same-session requests, making read-history-then-append atomic
    // from the caller's perspective.
    let session = ctx.sessions.get_or_create(session_id);
    let mut session_guard = session.lock().await;
    let history: Vec<Turn> = session_guard.history().to_vec();

    let standalone = reformulate(ctx.model.as_ref(), &history, query).await?;

    let query_vec = ctx
        .model
        .embed(&[standalone.clone()])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| RagError::upstream("empty embedding response".to_string()))?;

    let candidates = retrieve(ctx, &standalone, &query_vec, filter_source).await;

    let reranked = rerank(
        ctx.model.as_ref(),
        &standalone,
        candidates,
        ctx.config.retrieval.rerank_top_n,
    )
    .await?;

    let prompt = build_answer_prompt(&reranked, &history, query);
    let answer = ctx.model.generate(&prompt).await?;

    session_guard.append(query, answer.clone());

    let sources: BTreeSet<String> = reranked.iter().map(|c| c.chunk.citation()).collect();
    Ok(ChatOutcome {
        answer,
        sources: sources.into_iter().collect(),
    })
}

/// First-stage retrieval: scoped vector search or hybrid fusion.
async fn retrieve(
    ctx: &AppContext,
    query_text: &str,
    query_vec: &[f32],
    filter_source: Option<&str>,
) -> Vec<ScoredChunk> {
    let retrieval = &ctx.config.retrieval;

    if let Some(source) = filter_source {
        // Scoped search loses keyword recall, so it fetches more
        // vector candidates for the reranker to sift.
        info!(source, "scoped retrieval");
        return ctx
            .vector
            .read()
            .await
            .search(query_vec, retrieval.scoped_k, Some(source));
    }

    let vector_hits = ctx
        .vector
        .read()
        .await
        .search(query_vec, retrieval.vector_k, None);

    let keyword_hits = {
        let keyword = ctx.keyword.read().await;
        if keyword.is_empty() {
            None
        } else {
            Some(keyword.search(query_text, retrieval.keyword_k))
        }
    };

    match keyword_hits {
        Some(hits) => fuse(
            vector_hits,
            hits,
            FusionWeights {
                vector: retrieval.vector_weight,
                keyword: retrieval.keyword_weight,
            },
        ),
        None => {
            warn!("keyword index unavailable, falling back to vector-only retrieval");
            vector_hits
        }
    }
}

/// Rewrite a follow-up question into a standalone one using the
/// session history. Without history the question passes through
/// unchanged; this never touches the indices.
async fn reformulate(
    model: &dyn ModelClient,
    history: &[Turn],
    question: &str,
) -> Result<String> {
    if history.is_empty() {
        return Ok(question.to_string());
    }
    let mut prompt = String::from(
        "Given the conversation so far, rewrite the follow-up question as a standalone \
         question that can be understood without the conversation. Do not answer it; \
         respond with ONLY the rewritten question.\n\n",
    );
    for turn in history {
        prompt.push_str("User: ");
        prompt.push_str(&turn.question);
        prompt.push_str("\nAssistant: ");
        prompt.push_str(&turn.answer);
        prompt.push('\n');
    }
    prompt.push_str("\nFollow-up question: ");
    prompt.push_str(question);

    let rewritten = model.generate(&prompt).await?;
    let rewritten = rewritten.trim();
    if rewritten.is_empty() {
        Ok(question.to_string())
    } else {
        Ok(rewritten.to_string())
    }
}

fn build_answer_prompt(context: &[ScoredChunk], history: &[Turn], question: &str) -> String {
    let mut prompt = String::from(
        "You are an intelligent assistant. Answer the user's question based on the \
         provided context. If you don't know the answer from the context, say so.\n\nContext:\n",
    );
    for (i, chunk) in context.iter().enumerate() {
        if i > 0 {
            prompt.push_str("\n\n");
        }
        prompt.push_str(&chunk.chunk.text);
    }
    prompt.push('\n');
    for turn in history {
        prompt.push_str("\nUser: ");
        prompt.push_str(&turn.question);
        prompt.push_str("\nAssistant: ");
        prompt.push_str(&turn.answer);
    }
    prompt.push_str("\nUser: ");
    prompt.push_str(question);
    prompt
}
