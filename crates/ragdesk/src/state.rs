//! Process-wide application context.
//!
//! Constructed exactly once at startup and passed by reference (behind
//! `Arc`) into every request handler — there is no global mutable
//! state. Dropping the context at shutdown releases everything.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use ragdesk_core::index::keyword::KeywordIndex;
use ragdesk_core::index::vector::VectorIndex;
use ragdesk_core::session::ConversationStore;

use crate::config::Config;
use crate::model::ModelClient;

/// Shared mutable state: the two indices behind single-writer/
/// multiple-reader locks, the session map, the model client, and the
/// configuration.
pub struct AppContext {
    pub config: Config,
    pub model: Arc<dyn ModelClient>,
    pub vector: RwLock<VectorIndex>,
    pub keyword: RwLock<KeywordIndex>,
    pub sessions: ConversationStore,
}

impl AppContext {
    /// Build the context: restore the vector snapshot (non-fatal when
    /// absent or corrupt — the index starts empty) and rebuild the
    /// keyword index from the restored chunk set.
    pub fn init(config: Config, model: Arc<dyn ModelClient>) -> Self {
        let vector = match VectorIndex::restore(&config.snapshot.dir) {
            Ok(index) => {
                info!(
                    chunks = index.len(),
                    dir = %config.snapshot.dir.display(),
                    "restored vector index snapshot"
                );
                index
            }
            Err(e) => {
                warn!(
                    dir = %config.snapshot.dir.display(),
                    error = %e,
                    "no usable snapshot, starting with an empty index"
                );
                VectorIndex::new()
            }
        };
        let keyword = KeywordIndex::rebuild(&vector.all_chunks());

        Self {
            config,
            model,
            vector: RwLock::new(vector),
            keyword: RwLock::new(keyword),
            sessions: ConversationStore::new(),
        }
    }
}
