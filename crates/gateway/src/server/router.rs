//! Axum router construction.

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use super::{handlers, state::AppState};

/// Build the application [`Router`] with all routes and middleware attached.
///
/// CORS is fully open: the backend is consumed by a static frontend served
/// from arbitrary origins (including `file://`).
pub fn build(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let body_limit = state.config.max_upload_bytes as usize;

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/encrypt", post(handlers::encrypt))
        .route("/api/decrypt", post(handlers::decrypt))
        .route("/api/image/convert", post(handlers::convert_image))
        .route("/api/pdf/merge", post(handlers::merge_pdfs))
        .route("/api/chat", post(handlers::chat))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
