pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Form helpers (no completion call)
        .route("/api/v1/codes", get(handlers::handle_search_codes))
        .route("/api/v1/validate", post(handlers::handle_validate))
        .route("/api/v1/render", post(handlers::handle_render))
        // Sessions
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:session_id",
            delete(handlers::handle_delete_session),
        )
        // Note-only drafts (kept in the session, never in the ledger)
        .route(
            "/api/v1/sessions/:session_id/drafts",
            post(handlers::handle_draft),
        )
        .route(
            "/api/v1/sessions/:session_id/drafts/:id/pdf",
            get(handlers::handle_download_draft),
        )
        // Session-scoped submissions
        .route(
            "/api/v1/sessions/:session_id/submissions",
            post(handlers::handle_submit).get(handlers::handle_list_submissions),
        )
        .route(
            "/api/v1/sessions/:session_id/submissions/:id/pdf",
            get(handlers::handle_download),
        )
        .with_state(state)
}
