//! Request handlers for the question answering service.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use super::{ApiError, AppState};
use crate::RagError;
use crate::database::{StoredChunk, VectorStore};
use crate::ingest;

const DEFAULT_DOCUMENTS_LIMIT: usize = 10;
const DEFAULT_PREVIEW_LIMIT: usize = 5;
const PREVIEW_CONTENT_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

/// Health check. Never fails; reports whether retrieval grounding is active.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let rag_status = if state.store.read().await.is_some() {
        "active"
    } else {
        "inactive"
    };

    Json(json!({ "status": "up", "rag_status": rag_status }))
}

/// Answer a question, grounded in the corpus when a store is active.
///
/// The read guard covers retrieval only; generation runs after it is
/// released, so a reload never waits on an in-flight model call.
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<Value>, ApiError> {
    let prompt = {
        let store = state.store.read().await;
        state
            .answerer
            .prepare_prompt(&request.question, store.as_ref())
            .await?
    };
    let answer = state.answerer.complete(prompt).await?;

    Ok(Json(json!({
        "question": request.question,
        "answer": answer,
    })))
}

/// Index statistics. 503 while the store is uninitialized.
pub async fn db_stats(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let store = state.store.read().await;
    let store = active_store(&store)?;
    let total = store.document_count().await?;

    Ok(Json(json!({
        "total_documents": total,
        "status": "active",
    })))
}

/// List stored chunks with their metadata.
pub async fn db_documents(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Value>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_DOCUMENTS_LIMIT);

    let store = state.store.read().await;
    let store = active_store(&store)?;
    let documents = store.documents_with_metadata(limit).await?;

    Ok(Json(json!({
        "count": documents.len(),
        "documents": documents.iter().map(document_json).collect::<Vec<_>>(),
    })))
}

/// Preview stored chunks with truncated content.
pub async fn db_preview(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Value>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_PREVIEW_LIMIT);

    let store = state.store.read().await;
    let store = active_store(&store)?;
    let total = store.document_count().await?;
    let documents = store.documents_with_metadata(limit).await?;

    let previews: Vec<Value> = documents
        .iter()
        .map(|chunk| {
            let mut preview = document_json(chunk);
            preview["content"] = json!(truncate_chars(&chunk.content, PREVIEW_CONTENT_CHARS));
            preview
        })
        .collect();

    Ok(Json(json!({
        "preview_count": previews.len(),
        "total_documents": total,
        "documents": previews,
    })))
}

/// Wipe the persisted index and rebuild it from the corpus directory.
///
/// The write lock is held for the whole rebuild; if any step fails the store
/// is left uninitialized and readers get 503 until the next reload succeeds.
pub async fn db_reload(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    info!("Reload requested, rebuilding index from corpus");

    let mut guard = state.store.write().await;
    *guard = None;

    let index_dir = &state.config.storage.index_dir;
    if index_dir.exists() {
        tokio::fs::remove_dir_all(index_dir)
            .await
            .map_err(|e| RagError::Store(format!("Failed to clear index directory: {e}")))?;
    }

    let data_dir = state.config.storage.data_dir.clone();
    let chunking = state.config.chunking.clone();
    let chunks = tokio::task::spawn_blocking(move || ingest::scan_corpus(&data_dir, &chunking))
        .await
        .map_err(|e| RagError::Processing(format!("Corpus scan failed: {e}")))?;

    let store = if chunks.is_empty() {
        VectorStore::open(&state.config, state.client.clone()).await?
    } else {
        VectorStore::build(&state.config, state.client.clone(), &chunks).await?
    };
    let total = store.document_count().await?;
    *guard = Some(store);

    Ok(Json(json!({
        "status": "ok",
        "message": format!("Indexed {} chunks from {}", chunks.len(), state.config.storage.data_dir.display()),
        "total_documents": total,
    })))
}

/// List the corpus files on disk. Never fails; an absent directory yields an
/// empty list.
pub async fn db_files(State(state): State<AppState>) -> Json<Value> {
    let files = ingest::list_corpus_files(&state.config.storage.data_dir);

    Json(json!({
        "count": files.len(),
        "files": files,
        "data_directory": state.config.storage.data_dir,
    }))
}

fn active_store<'a>(store: &'a Option<VectorStore>) -> Result<&'a VectorStore, ApiError> {
    store.as_ref().ok_or(ApiError(RagError::Uninitialized))
}

fn document_json(chunk: &StoredChunk) -> Value {
    json!({
        "content": chunk.content,
        "metadata": {
            "source": chunk.source,
            "page": chunk.page,
            "chunk_index": chunk.chunk_index,
        },
    })
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let truncated: String = text.chars().take(max_chars).collect();
    format!("{truncated}...")
}
