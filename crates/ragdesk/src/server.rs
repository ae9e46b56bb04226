//! JSON HTTP surface.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/api/documents` | Sorted unique source names |
//! | `POST` | `/api/upload-and-process` | Multipart upload → analysis |
//! | `POST` | `/api/chat` | Question → answer with cited sources |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error contract
//!
//! Error responses carry a human-readable body:
//!
//! ```json
//! { "detail": "unsupported file type: .pptx" }
//! ```
//!
//! Validation errors map to 400, an empty knowledge base to 404, and
//! upstream/internal failures to 500. Internal stack context is
//! logged, never returned.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support
//! browser-based clients.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

use ragdesk_core::error::RagError;

use crate::analysis::Analysis;
use crate::config::Config;
use crate::model::ModelClient;
use crate::pipeline;
use crate::state::AppContext;

/// Start the server: build the [`AppContext`] (restoring the snapshot),
/// bind, and serve until the process is terminated.
pub async fn run_server(config: Config, model: Arc<dyn ModelClient>) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let ctx = Arc::new(AppContext::init(config, model));

    let app = router(ctx);

    tracing::info!(addr = %bind_addr, "ragdesk listening");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the router; split out so tests can drive it in-process.
pub fn router(ctx: Arc<AppContext>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/documents", get(handle_list_documents))
        .route("/api/upload-and-process", post(handle_upload))
        .route("/api/chat", post(handle_chat))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(ctx)
}

// ============ Error response ============

/// JSON error body: `{ "detail": "<message>" }`.
#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

struct AppError {
    status: StatusCode,
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                detail: self.detail,
            }),
        )
            .into_response()
    }
}

impl From<RagError> for AppError {
    fn from(err: RagError) -> Self {
        let status = match &err {
            RagError::Validation(_) => StatusCode::BAD_REQUEST,
            RagError::EmptyIndex(_) => StatusCode::NOT_FOUND,
            RagError::Upstream(_) | RagError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %err, "request failed");
        }
        AppError {
            status,
            detail: err.to_string(),
        }
    }
}

fn bad_request(detail: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        detail: detail.into(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /api/documents ============

/// Unique source names in the knowledge base. An empty list — not an
/// error — when nothing has been indexed yet.
async fn handle_list_documents(State(ctx): State<Arc<AppContext>>) -> Json<Vec<String>> {
    Json(ctx.vector.read().await.sources())
}

// ============ POST /api/upload-and-process ============

/// Multipart upload: extracts, analyzes, and indexes one document,
/// returning the analysis.
async fn handle_upload(
    State(ctx): State<Arc<AppContext>>,
    mut multipart: Multipart,
) -> Result<Json<Analysis>, AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("invalid multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            let filename = field
                .file_name()
                .map(str::to_string)
                .ok_or_else(|| bad_request("file field is missing a filename"))?;
            let bytes = field
                .bytes()
                .await
                .map_err(|e| bad_request(format!("failed to read upload: {}", e)))?;
            upload = Some((filename, bytes.to_vec()));
        }
    }
    let (filename, bytes) =
        upload.ok_or_else(|| bad_request("multipart body must contain a 'file' field"))?;

    let analysis = pipeline::ingest_document(&ctx, &filename, &bytes).await?;
    Ok(Json(analysis))
}

// ============ POST /api/chat ============

#[derive(Deserialize)]
struct ChatRequest {
    query: String,
    /// Caller-supplied conversation thread identifier.
    session_id: String,
    /// When set, retrieval is scoped to this one document.
    #[serde(default)]
    filter_source: Option<String>,
}

#[derive(Serialize)]
struct ChatResponse {
    answer: String,
    sources: Vec<String>,
}

async fn handle_chat(
    State(ctx): State<Arc<AppContext>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let outcome = pipeline::chat(
        &ctx,
        &request.query,
        &request.session_id,
        request.filter_source.as_deref(),
    )
    .await?;
    Ok(Json(ChatResponse {
        answer: outcome.answer,
        sources: outcome.sources,
    }))
}
