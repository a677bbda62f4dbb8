//! Route definitions for the `/alerts` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::alert;
use crate::state::AppState;

/// Routes mounted at `/alerts`.
///
/// ```text
/// GET    /                    -> list
/// GET    /{id}                -> get_by_id
/// POST   /{id}/acknowledge    -> acknowledge
/// POST   /{id}/resolve        -> resolve
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(alert::list))
        .route("/{id}", get(alert::get_by_id))
        .route("/{id}/acknowledge", post(alert::acknowledge))
        .route("/{id}/resolve", post(alert::resolve))
}
