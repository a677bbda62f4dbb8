//! Handlers for the `/hubs` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use storewatch_core::error::CoreError;
use storewatch_core::types::DbId;
use storewatch_db::models::hub::{CreateHub, HeartbeatRequest, Hub};
use storewatch_db::repositories::HubRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /hubs`.
#[derive(Debug, Deserialize)]
pub struct HubListQuery {
    pub site_id: Option<DbId>,
}

/// POST /api/v1/hubs
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateHub>,
) -> AppResult<(StatusCode, Json<DataResponse<Hub>>)> {
    let hub = HubRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: hub })))
}

/// GET /api/v1/hubs
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HubListQuery>,
) -> AppResult<Json<DataResponse<Vec<Hub>>>> {
    let hubs = HubRepo::list(&state.pool, params.site_id).await?;
    Ok(Json(DataResponse { data: hubs }))
}

/// GET /api/v1/hubs/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Hub>>> {
    let hub = HubRepo::get(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Hub", id }))?;
    Ok(Json(DataResponse { data: hub }))
}

/// POST /api/v1/hubs/{id}/heartbeat
///
/// Record a heartbeat: refreshes `last_seen_at`, stores reported firmware
/// and revives an `offline` hub. The self-reported `status` field is
/// informational only; the heartbeat itself is the liveness signal.
pub async fn heartbeat(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<HeartbeatRequest>,
) -> AppResult<Json<DataResponse<Hub>>> {
    let hub = HubRepo::record_heartbeat(&state.pool, id, input.firmware_version.as_deref())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Hub", id }))?;
    Ok(Json(DataResponse { data: hub }))
}
