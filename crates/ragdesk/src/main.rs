//! # ragdesk CLI
//!
//! The `ragdesk` binary starts the document Q&A server.
//!
//! ## Usage
//!
//! ```bash
//! ragdesk --config ./config/ragdesk.toml serve
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ragdesk serve` | Start the HTTP server (upload, chat, documents) |
//!
//! Logging is controlled with `RUST_LOG` (e.g. `RUST_LOG=ragdesk=debug`);
//! the default level is `info`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ragdesk::config;
use ragdesk::model::OllamaClient;
use ragdesk::server;

/// ragdesk — a local-first document Q&A server with hybrid retrieval.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/ragdesk.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "ragdesk",
    about = "ragdesk — a local-first document Q&A server with hybrid retrieval",
    version,
    long_about = "ragdesk ingests PDF and plain-text documents, indexes them for hybrid \
    (semantic + keyword) retrieval, and answers questions over HTTP with cited sources, \
    using locally hosted models for generation, embeddings, and reranking."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/ragdesk.toml`. Server, model, chunking,
    /// retrieval, and webhook settings are read from this file.
    #[arg(long, global = true, default_value = "./config/ragdesk.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Binds to the address configured in `[server].bind`, restores the
    /// index snapshot if one exists, and serves the upload, chat, and
    /// document-listing endpoints.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            let model = Arc::new(OllamaClient::new(cfg.models.clone())?);
            server::run_server(cfg, model).await?;
        }
    }

    Ok(())
}
