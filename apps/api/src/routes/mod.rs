pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::edits::handlers;
use crate::state::AppState;

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Session lifecycle
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id/suggestions",
            post(handlers::handle_generate_suggestions).get(handlers::handle_list_suggestions),
        )
        .route(
            "/api/v1/sessions/:id/suggestions/:sid",
            patch(handlers::handle_review_suggestion),
        )
        // Export
        .route("/api/v1/sessions/:id/export", post(handlers::handle_export))
        .route("/api/v1/sessions/:id/audit", get(handlers::handle_get_audit))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
