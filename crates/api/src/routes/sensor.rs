//! Route definitions for the `/sensors` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::sensor;
use crate::state::AppState;

/// Routes mounted at `/sensors`.
///
/// ```text
/// GET    /                  -> list
/// POST   /                  -> create
/// GET    /{id}              -> get_by_id
/// PATCH  /{id}              -> update
/// GET    /{id}/readings     -> list_readings
/// GET    /{id}/aggregates   -> list_aggregates
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(sensor::list).post(sensor::create))
        .route("/{id}", get(sensor::get_by_id).patch(sensor::update))
        .route("/{id}/readings", get(sensor::list_readings))
        .route("/{id}/aggregates", get(sensor::list_aggregates))
}
