//! Annotation API routes
//!
//! Records are immutable: create, list, delete. There is no update.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::annotations::{Annotation, AnnotationRepository, CreateAnnotation};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Create the annotations router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_annotation))
        .route("/document/:document_id", get(list_document_annotations))
        .route("/document/:document_id/count", get(count_annotations))
        .route("/:id", get(get_annotation))
        .route("/:id", delete(delete_annotation))
}

/// Author scoping for list queries
#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

/// Create a new annotation
async fn create_annotation(
    State(state): State<AppState>,
    Json(data): Json<CreateAnnotation>,
) -> Result<(StatusCode, Json<Annotation>)> {
    if data.selected_text.is_empty() || data.comment.is_empty() {
        return Err(AppError::BadRequest(
            "selectedText and comment are required".to_string(),
        ));
    }
    if !data.anchor.offsets_in_bounds() {
        return Err(AppError::BadRequest(
            "range offsets are outside the anchored text".to_string(),
        ));
    }

    let repo = AnnotationRepository::new(state.db());
    let annotation = repo.create(&data).await?;

    tracing::debug!(id = %annotation.id, document_id = %annotation.document_id, "annotation created");
    Ok((StatusCode::CREATED, Json(annotation)))
}

/// List annotations for a document
async fn list_document_annotations(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Annotation>>> {
    let repo = AnnotationRepository::new(state.db());
    let annotations = repo
        .list_for_document(&document_id, query.user_id.as_deref())
        .await?;
    Ok(Json(annotations))
}

/// Get a specific annotation
async fn get_annotation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Annotation>> {
    let repo = AnnotationRepository::new(state.db());
    let annotation = repo
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Annotation not found: {}", id)))?;
    Ok(Json(annotation))
}

/// Delete an annotation
async fn delete_annotation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let repo = AnnotationRepository::new(state.db());
    let deleted = repo.delete(&id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Annotation not found: {}", id)))
    }
}

/// Count annotations for a document
async fn count_annotations(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let repo = AnnotationRepository::new(state.db());
    let count = repo.count_for_document(&document_id).await?;
    Ok(Json(serde_json::json!({ "count": count })))
}
