//! Route modules for the Marginalia server

pub mod annotations;
pub mod documents;
pub mod health;
pub mod highlights;
pub mod sync;

use axum::Router;

use crate::state::AppState;

/// Assemble the full API router
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .nest("/api/v1/annotations", annotations::router())
        .nest("/api/v1/highlights", highlights::router())
        .nest("/api/v1/documents", documents::router())
        .nest("/api/v1/sync", sync::router())
        .with_state(state)
}
