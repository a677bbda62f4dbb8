//! Handlers for the `/sensor-types` catalog.

use axum::extract::State;
use axum::Json;
use storewatch_db::models::sensor_type::SensorType;
use storewatch_db::repositories::SensorTypeRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/sensor-types
///
/// The seeded catalog of sensor types with their units, valid ranges and
/// default alerting bounds.
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<SensorType>>>> {
    let types = SensorTypeRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: types }))
}
