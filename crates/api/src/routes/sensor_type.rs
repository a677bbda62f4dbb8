//! Route definitions for the `/sensor-types` catalog.

use axum::routing::get;
use axum::Router;

use crate::handlers::sensor_type;
use crate::state::AppState;

/// Routes mounted at `/sensor-types`.
///
/// ```text
/// GET /  -> list
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(sensor_type::list))
}
