//! Route definitions for the `/ingest` endpoints.

use axum::routing::post;
use axum::Router;

use crate::handlers::ingest;
use crate::state::AppState;

/// Routes mounted at `/ingest`.
///
/// ```text
/// POST /reading    -> ingest_reading
/// POST /readings   -> ingest_batch
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reading", post(ingest::ingest_reading))
        .route("/readings", post(ingest::ingest_batch))
}
