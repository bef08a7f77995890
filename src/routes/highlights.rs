//! Highlight API routes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::annotations::{CreateHighlight, Highlight, HighlightRepository};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Create the highlights router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_highlight))
        .route("/document/:document_id", get(list_document_highlights))
        .route("/document/:document_id/count", get(count_highlights))
        .route("/:id", get(get_highlight))
        .route("/:id", delete(delete_highlight))
}

/// Author scoping for list queries
#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

/// Create a new highlight
async fn create_highlight(
    State(state): State<AppState>,
    Json(data): Json<CreateHighlight>,
) -> Result<(StatusCode, Json<Highlight>)> {
    if data.selected_text.is_empty() {
        return Err(AppError::BadRequest("selectedText is required".to_string()));
    }
    if !data.anchor.offsets_in_bounds() {
        return Err(AppError::BadRequest(
            "range offsets are outside the anchored text".to_string(),
        ));
    }

    let repo = HighlightRepository::new(state.db());
    let highlight = repo.create(&data).await?;

    tracing::debug!(id = %highlight.id, document_id = %highlight.document_id, "highlight created");
    Ok((StatusCode::CREATED, Json(highlight)))
}

/// List highlights for a document
async fn list_document_highlights(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Highlight>>> {
    let repo = HighlightRepository::new(state.db());
    let highlights = repo
        .list_for_document(&document_id, query.user_id.as_deref())
        .await?;
    Ok(Json(highlights))
}

/// Get a specific highlight
async fn get_highlight(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Highlight>> {
    let repo = HighlightRepository::new(state.db());
    let highlight = repo
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Highlight not found: {}", id)))?;
    Ok(Json(highlight))
}

/// Delete a highlight
async fn delete_highlight(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let repo = HighlightRepository::new(state.db());
    let deleted = repo.delete(&id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Highlight not found: {}", id)))
    }
}

/// Count highlights for a document
async fn count_highlights(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let repo = HighlightRepository::new(state.db());
    let count = repo.count_for_document(&document_id).await?;
    Ok(Json(serde_json::json!({ "count": count })))
}
