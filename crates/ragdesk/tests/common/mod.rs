//! Shared test fixtures: a deterministic in-process model and context
//! builders.
//!
//! The mock model answers the analysis, reformulation, and synthesis
//! prompts with canned text, embeds by hashed bag-of-words, and
//! rerank-scores by query-word overlap, so every assertion built on it
//! is reproducible without a model server.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use ragdesk::config::{
    ChunkingConfig, Config, ModelsConfig, RetrievalConfig, ServerConfig, SnapshotConfig,
    WebhooksConfig,
};
use ragdesk::model::ModelClient;
use ragdesk::state::AppContext;
use ragdesk_core::error::Result;
use ragdesk_core::rerank::RelevanceScorer;

pub const EMBED_DIMS: usize = 8;
pub const CANNED_ANSWER: &str = "The refund window is 30 days.";

pub const REFUND_DOC: &str = "Refunds are accepted within 30 days of purchase. Electronics must \
                              be unopened. Contact the finance team to initiate a refund claim.";
pub const SAFETY_DOC: &str = "All contractors must complete the safety induction before entering \
                              the depot. Hard hats are mandatory in marked zones.";

/// Deterministic stand-in for the model server. Records every
/// generation prompt so tests can assert on what the pipeline sent.
#[derive(Default)]
pub struct MockModel {
    prompts: Mutex<Vec<String>>,
}

impl MockModel {
    pub fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

fn bag_of_words(text: &str) -> Vec<f32> {
    let mut vec = vec![0.0f32; EMBED_DIMS];
    for word in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let slot = word.bytes().map(|b| b as usize).sum::<usize>() % EMBED_DIMS;
        vec[slot] += 1.0;
    }
    vec
}

#[async_trait]
impl ModelClient for MockModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let response = if prompt.contains("concise, professional summary") {
            "A short summary of the document."
        } else if prompt.contains("actionable tasks") {
            "- Review the refund policy\n- Notify the finance team"
        } else if prompt.contains("single most relevant employee role") {
            "Finance Manager"
        } else if prompt.contains("rewrite the follow-up question") {
            "What is the refund window for electronics?"
        } else {
            CANNED_ANSWER
        };
        Ok(response.to_string())
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| bag_of_words(t)).collect())
    }
}

#[async_trait]
impl RelevanceScorer for MockModel {
    async fn score_pairs(&self, query: &str, texts: &[String]) -> Result<Vec<f32>> {
        let words: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        Ok(texts
            .iter()
            .map(|t| {
                let lower = t.to_lowercase();
                words.iter().filter(|w| lower.contains(w.as_str())).count() as f32
            })
            .collect())
    }
}

pub fn test_config(snapshot_dir: std::path::PathBuf) -> Config {
    Config {
        server: ServerConfig {
            bind: "127.0.0.1:0".to_string(),
        },
        models: ModelsConfig::default(),
        chunking: ChunkingConfig::default(),
        retrieval: RetrievalConfig::default(),
        snapshot: SnapshotConfig { dir: snapshot_dir },
        webhooks: WebhooksConfig::default(),
    }
}

pub fn test_context(snapshot_dir: std::path::PathBuf) -> (Arc<AppContext>, Arc<MockModel>) {
    let model = Arc::new(MockModel::default());
    let ctx = Arc::new(AppContext::init(test_config(snapshot_dir), model.clone()));
    (ctx, model)
}
