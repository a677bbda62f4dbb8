//! Route definitions for per-site queries.

use axum::routing::get;
use axum::Router;

use crate::handlers::site;
use crate::state::AppState;

/// Routes mounted at `/sites`.
///
/// ```text
/// GET /{id}/overview  -> overview
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/overview", get(site::overview))
}
