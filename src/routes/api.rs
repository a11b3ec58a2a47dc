//! API route construction.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};

use crate::handlers;
use crate::state::AppState;

/// Uploads are capped at the same size the ingest boundary accepts for
/// remote fetches (32 MiB); the axum default of 2 MiB is too small for
/// voice recordings.
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Build the API router.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/v1/transcribe", post(handlers::transcribe))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
