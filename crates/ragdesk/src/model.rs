//! Model call contract: generation, embeddings, and pairwise rerank
//! scoring consumed over HTTP.
//!
//! The pipeline only sees the [`ModelClient`] trait; the production
//! implementation targets an Ollama-compatible server (`/api/generate`,
//! `/api/embed`) plus a TEI-style `/api/rerank` endpoint for the
//! cross-encoder. Upstream failures surface as
//! [`RagError::Upstream`] and are not retried here — retry policy, if
//! any, belongs to the serving side.

use std::time::Duration;

use async_trait::async_trait;
use ragdesk_core::error::{RagError, Result};
use ragdesk_core::rerank::RelevanceScorer;

use crate::config::ModelsConfig;

/// Everything the pipeline needs from the model services.
///
/// `RelevanceScorer` is a supertrait so one client hands the reranker
/// its scoring contract directly.
#[async_trait]
pub trait ModelClient: RelevanceScorer {
    /// One completion for `prompt`. Blocking (non-streamed) response.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// One embedding vector per input text, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// HTTP client for an Ollama-compatible model server.
pub struct OllamaClient {
    http: reqwest::Client,
    config: ModelsConfig,
}

impl OllamaClient {
    pub fn new(config: ModelsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RagError::internal(format!("build http client: {}", e)))?;
        Ok(Self { http, config })
    }

    async fn post_json(&self, path: &str, body: serde_json::Value) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.config.url, path);
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                RagError::upstream(format!(
                    "model server unreachable at {} (is it running?): {}",
                    url, e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(RagError::upstream(format!(
                "{} returned {}: {}",
                url, status, detail
            )));
        }
        response
            .json()
            .await
            .map_err(|e| RagError::upstream(format!("invalid JSON from {}: {}", url, e)))
    }
}

#[async_trait]
impl ModelClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let json = self
            .post_json(
                "/api/generate",
                serde_json::json!({
                    "model": self.config.llm_model,
                    "prompt": prompt,
                    "stream": false,
                    "options": { "temperature": self.config.temperature },
                }),
            )
            .await?;
        json.get("response")
            .and_then(|r| r.as_str())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| RagError::upstream("generate response missing 'response' field".to_string()))
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let json = self
            .post_json(
                "/api/embed",
                serde_json::json!({
                    "model": self.config.embedding_model,
                    "input": texts,
                }),
            )
            .await?;
        let embeddings = json
            .get("embeddings")
            .and_then(|e| e.as_array())
            .ok_or_else(|| {
                RagError::upstream("embed response missing 'embeddings' array".to_string())
            })?;

        let mut result = Vec::with_capacity(embeddings.len());
        for embedding in embeddings {
            let vec: Vec<f32> = embedding
                .as_array()
                .ok_or_else(|| {
                    RagError::upstream("embed response entry is not an array".to_string())
                })?
                .iter()
                .map(|v| v.as_f64().unwrap_or(0.0) as f32)
                .collect();
            result.push(vec);
        }
        if result.len() != texts.len() {
            return Err(RagError::upstream(format!(
                "embed returned {} vectors for {} inputs",
                result.len(),
                texts.len()
            )));
        }
        Ok(result)
    }
}

#[async_trait]
impl RelevanceScorer for OllamaClient {
    async fn score_pairs(&self, query: &str, texts: &[String]) -> Result<Vec<f32>> {
        let json = self
            .post_json(
                "/api/rerank",
                serde_json::json!({
                    "model": self.config.reranker_model,
                    "query": query,
                    "documents": texts,
                }),
            )
            .await?;
        let scores = json
            .get("scores")
            .and_then(|s| s.as_array())
            .ok_or_else(|| {
                RagError::upstream("rerank response missing 'scores' array".to_string())
            })?;
        Ok(scores
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect())
    }
}
