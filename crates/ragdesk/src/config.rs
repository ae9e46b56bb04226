//! TOML configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub webhooks: WebhooksConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

/// Model service endpoints and parameters. All three model roles (LLM,
/// embeddings, reranker) are consumed over HTTP from one base URL.
#[derive(Debug, Deserialize, Clone)]
pub struct ModelsConfig {
    #[serde(default = "default_model_url")]
    pub url: String,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_reranker_model")]
    pub reranker_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            url: default_model_url(),
            llm_model: default_llm_model(),
            embedding_model: default_embedding_model(),
            reranker_model: default_reranker_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_model_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_llm_model() -> String {
    "llama3".to_string()
}
fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}
fn default_reranker_model() -> String {
    "bge-reranker-base".to_string()
}
fn default_temperature() -> f32 {
    0.2
}
fn default_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
        }
    }
}

fn default_chunk_size() -> usize {
    1000
}
fn default_overlap() -> usize {
    150
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Top-k fetched from the vector index in hybrid retrieval.
    #[serde(default = "default_candidate_k")]
    pub vector_k: usize,
    /// Top-k fetched from the keyword index in hybrid retrieval.
    #[serde(default = "default_candidate_k")]
    pub keyword_k: usize,
    #[serde(default = "default_weight")]
    pub vector_weight: f32,
    #[serde(default = "default_weight")]
    pub keyword_weight: f32,
    /// Larger k for scoped (single-document) vector search,
    /// compensating for the lost keyword recall.
    #[serde(default = "default_scoped_k")]
    pub scoped_k: usize,
    /// Candidates kept after reranking.
    #[serde(default = "default_rerank_top_n")]
    pub rerank_top_n: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            vector_k: default_candidate_k(),
            keyword_k: default_candidate_k(),
            vector_weight: default_weight(),
            keyword_weight: default_weight(),
            scoped_k: default_scoped_k(),
            rerank_top_n: default_rerank_top_n(),
        }
    }
}

fn default_candidate_k() -> usize {
    10
}
fn default_weight() -> f32 {
    0.5
}
fn default_scoped_k() -> usize {
    30
}
fn default_rerank_top_n() -> usize {
    4
}

#[derive(Debug, Deserialize, Clone)]
pub struct SnapshotConfig {
    /// Directory the vector index snapshot is written to after every
    /// successful ingestion and loaded from at startup.
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct WebhooksConfig {
    /// Destinations notified with the analysis result after ingestion.
    #[serde(default)]
    pub urls: Vec<String>,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            bind = "127.0.0.1:8000"

            [snapshot]
            dir = "./data/snapshot"
            "#,
        )
        .unwrap();
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.overlap, 150);
        assert_eq!(config.retrieval.vector_k, 10);
        assert_eq!(config.retrieval.scoped_k, 30);
        assert_eq!(config.retrieval.rerank_top_n, 4);
        assert!((config.retrieval.vector_weight - 0.5).abs() < 1e-6);
        assert!(config.webhooks.urls.is_empty());
        assert_eq!(config.models.url, "http://localhost:11434");
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            bind = "0.0.0.0:9000"

            [snapshot]
            dir = "/var/lib/ragdesk"

            [retrieval]
            vector_weight = 0.7
            keyword_weight = 0.3
            rerank_top_n = 6

            [webhooks]
            urls = ["http://n8n.local/hook"]
            "#,
        )
        .unwrap();
        assert!((config.retrieval.vector_weight - 0.7).abs() < 1e-6);
        assert_eq!(config.retrieval.rerank_top_n, 6);
        assert_eq!(config.webhooks.urls.len(), 1);
    }
}
