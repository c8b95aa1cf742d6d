// HTTP server module
// axum routing and request handling over the retrieval pipeline


pub mod routes;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::database::VectorStore;
use crate::embeddings::OllamaClient;
use crate::qa::AnswerService;
use crate::{RagError, Result};

/// The vector store shared across requests. `None` is the explicit
/// uninitialized state; the write lock is held for reloads and incremental
/// adds so readers never observe a half-rebuilt index.
pub type SharedStore = Arc<RwLock<Option<VectorStore>>>;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: OllamaClient,
    pub answerer: AnswerService,
    pub store: SharedStore,
}

impl AppState {
    #[inline]
    pub fn new(config: Config, client: OllamaClient, store: Option<VectorStore>) -> Self {
        Self {
            config: Arc::new(config),
            answerer: AnswerService::new(client.clone()),
            client,
            store: Arc::new(RwLock::new(store)),
        }
    }
}

/// Error wrapper mapping the crate's error taxonomy onto HTTP statuses.
#[derive(Debug)]
pub struct ApiError(pub RagError);

impl From<RagError> for ApiError {
    #[inline]
    fn from(err: RagError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    #[inline]
    fn into_response(self) -> Response {
        let status = match &self.0 {
            RagError::Uninitialized => StatusCode::SERVICE_UNAVAILABLE,
            RagError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            RagError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Build the axum router with all routes.
#[inline]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/ask", post(routes::ask))
        .route("/db/stats", get(routes::db_stats))
        .route("/db/documents", get(routes::db_documents))
        .route("/db/preview", get(routes::db_preview))
        .route("/db/reload", post(routes::db_reload))
        .route("/db/files", get(routes::db_files))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured address and serve requests until shutdown.
#[inline]
pub async fn serve(config: Config, client: OllamaClient, store: Option<VectorStore>) -> Result<()> {
    let address = config.bind_address();
    let state = AppState::new(config, client, store);
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Listening on http://{}", address);

    axum::serve(listener, router)
        .await
        .map_err(|e| RagError::Other(anyhow::anyhow!("Server error: {e}")))?;

    Ok(())
}
