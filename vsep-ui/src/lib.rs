//! vsep-ui library - interactive vocal/melody separation web form
//!
//! Each browser session uploads a file or submits a link, optionally picks a
//! segment, and separates it once; results are played back and downloaded
//! from memory.

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod error;
pub mod fetch;
pub mod session;

use session::{SessionController, SessionStore};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SessionStore>,
    pub controller: Arc<SessionController>,
    /// Maximum request body size for form posts
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        store: SessionStore,
        controller: SessionController,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            store: Arc::new(store),
            controller: Arc::new(controller),
            max_upload_bytes,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let limit = state.max_upload_bytes;

    let pages = Router::new()
        .route("/", get(api::show_form).post(api::submit_form))
        .route("/audio/:kind", get(api::serve_track))
        .layer(DefaultBodyLimit::max(limit));

    Router::new()
        .merge(pages)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
