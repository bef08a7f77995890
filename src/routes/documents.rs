//! Document API routes
//!
//! Ingested markup is sanitized before storage; what is stored is exactly
//! what viewers render, so anchors resolve against the same bytes on every
//! client.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, put},
    Json, Router,
};
use serde::Deserialize;

use crate::annotations::{AnnotationRepository, HighlightRepository};
use crate::documents::{DocumentRepository, DocumentSummary, StoredDocument};
use crate::error::{AppError, Result};
use crate::markup::sanitize_document;
use crate::state::AppState;

/// Create the documents router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_documents))
        .route("/:id", put(put_document))
        .route("/:id", get(get_document))
        .route("/:id", delete(delete_document))
        .route("/:id/annotations", delete(reset_document_annotations))
}

/// Document ingestion payload
#[derive(Debug, Deserialize)]
struct PutDocument {
    title: String,
    html: String,
}

/// List all documents
async fn list_documents(State(state): State<AppState>) -> Result<Json<Vec<DocumentSummary>>> {
    let repo = DocumentRepository::new(state.db());
    let documents = repo.list().await?;
    Ok(Json(documents))
}

/// Ingest or replace a document
async fn put_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(data): Json<PutDocument>,
) -> Result<Json<StoredDocument>> {
    if data.title.is_empty() {
        return Err(AppError::BadRequest("title is required".to_string()));
    }

    let html = sanitize_document(&data.html)
        .map_err(|e| AppError::BadRequest(format!("unusable markup: {}", e)))?;

    let repo = DocumentRepository::new(state.db());
    let document = repo.upsert(&id, &data.title, &html).await?;

    tracing::info!(id = %document.id, "document ingested ({} bytes)", document.html.len());
    Ok(Json(document))
}

/// Get a document
async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredDocument>> {
    let repo = DocumentRepository::new(state.db());
    let document = repo
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document not found: {}", id)))?;
    Ok(Json(document))
}

/// Delete a document along with its annotations and highlights
async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let repo = DocumentRepository::new(state.db());
    let deleted = repo.delete(&id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("Document not found: {}", id)));
    }

    AnnotationRepository::new(state.db())
        .delete_for_document(&id)
        .await?;
    HighlightRepository::new(state.db())
        .delete_for_document(&id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Bulk reset: remove every annotation and highlight for a document.
/// Clients clear their live decorations through their reconciler.
async fn reset_document_annotations(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let annotations = AnnotationRepository::new(state.db())
        .delete_for_document(&id)
        .await?;
    let highlights = HighlightRepository::new(state.db())
        .delete_for_document(&id)
        .await?;

    tracing::info!(
        document_id = %id,
        "reset removed {} annotations and {} highlights",
        annotations,
        highlights
    );
    Ok(Json(serde_json::json!({
        "annotationsDeleted": annotations,
        "highlightsDeleted": highlights,
    })))
}
