use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::{handlers, AppState};

/// Create the application router with the form and API endpoints
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        // The form
        .route("/", get(handlers::index))
        .route("/analyze", post(handlers::analyze_form))
        // Headless download
        .route("/api/analyze", post(handlers::analyze_download))
        // Health check
        .route("/health", get(handlers::health_check))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
}
