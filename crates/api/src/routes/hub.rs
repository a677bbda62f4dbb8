//! Route definitions for the `/hubs` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::hub;
use crate::state::AppState;

/// Routes mounted at `/hubs`.
///
/// ```text
/// GET    /                 -> list
/// POST   /                 -> create
/// GET    /{id}             -> get_by_id
/// POST   /{id}/heartbeat   -> heartbeat
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(hub::list).post(hub::create))
        .route("/{id}", get(hub::get_by_id))
        .route("/{id}/heartbeat", post(hub::heartbeat))
}
