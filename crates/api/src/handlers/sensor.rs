//! Handlers for the `/sensors` resource, including per-sensor reading and
//! aggregate history.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use storewatch_core::aggregation::PeriodKind;
use storewatch_core::error::CoreError;
use storewatch_core::types::{DbId, Timestamp};
use storewatch_db::models::reading::Reading;
use storewatch_db::models::reading_aggregate::ReadingAggregate;
use storewatch_db::models::sensor::{CreateSensor, Sensor, UpdateSensor};
use storewatch_db::repositories::{ReadingAggregateRepo, ReadingRepo, SensorRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /sensors`.
#[derive(Debug, Deserialize)]
pub struct SensorListQuery {
    pub site_id: Option<DbId>,
    /// Filter on `active` / `offline`.
    pub status: Option<String>,
}

/// Query parameters for `GET /sensors/{id}/readings`.
#[derive(Debug, Deserialize)]
pub struct ReadingHistoryQuery {
    /// Inclusive lower bound on `recorded_at`.
    pub from: Option<Timestamp>,
    /// Exclusive upper bound on `recorded_at`.
    pub to: Option<Timestamp>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for `GET /sensors/{id}/aggregates`.
#[derive(Debug, Deserialize)]
pub struct AggregateHistoryQuery {
    /// `hourly`, `daily`, `weekly` or `monthly`; omitted returns all kinds.
    pub period_kind: Option<String>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/sensors
///
/// Register a sensor under a hub. The sensor's `site_id` is inherited from
/// the hub; a missing hub yields 404.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateSensor>,
) -> AppResult<(StatusCode, Json<DataResponse<Sensor>>)> {
    let hub_id = input.hub_id;
    let sensor = SensorRepo::create(&state.pool, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Hub",
            id: hub_id,
        }))?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: sensor })))
}

/// GET /api/v1/sensors
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<SensorListQuery>,
) -> AppResult<Json<DataResponse<Vec<Sensor>>>> {
    let sensors =
        SensorRepo::list(&state.pool, params.site_id, params.status.as_deref()).await?;
    Ok(Json(DataResponse { data: sensors }))
}

/// GET /api/v1/sensors/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Sensor>>> {
    let sensor = SensorRepo::get(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Sensor",
            id,
        }))?;
    Ok(Json(DataResponse { data: sensor }))
}

/// PATCH /api/v1/sensors/{id}
///
/// Partial update: threshold overrides, `alerts_enabled`, reporting cadence,
/// rebinding to another storage unit.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSensor>,
) -> AppResult<Json<DataResponse<Sensor>>> {
    let sensor = SensorRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Sensor",
            id,
        }))?;
    Ok(Json(DataResponse { data: sensor }))
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// GET /api/v1/sensors/{id}/readings
///
/// Raw reading history, newest first, paginated. `from` is inclusive and
/// `to` exclusive.
pub async fn list_readings(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<ReadingHistoryQuery>,
) -> AppResult<Json<DataResponse<Vec<Reading>>>> {
    ensure_sensor_exists(&state, id).await?;

    let readings = ReadingRepo::list_for_sensor(
        &state.pool,
        id,
        params.from,
        params.to,
        params.limit,
        params.offset,
    )
    .await?;
    Ok(Json(DataResponse { data: readings }))
}

/// GET /api/v1/sensors/{id}/aggregates
///
/// Rollup history ordered by period start. An invalid `period_kind` is a
/// 400.
pub async fn list_aggregates(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<AggregateHistoryQuery>,
) -> AppResult<Json<DataResponse<Vec<ReadingAggregate>>>> {
    ensure_sensor_exists(&state, id).await?;

    if let Some(kind) = params.period_kind.as_deref() {
        kind.parse::<PeriodKind>().map_err(AppError::Core)?;
    }

    let aggregates = ReadingAggregateRepo::list_for_sensor(
        &state.pool,
        id,
        params.period_kind.as_deref(),
        params.from,
        params.to,
    )
    .await?;
    Ok(Json(DataResponse { data: aggregates }))
}

/// 404 for history endpoints on a sensor that does not exist, instead of an
/// empty list.
async fn ensure_sensor_exists(state: &AppState, id: DbId) -> AppResult<()> {
    SensorRepo::get(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Sensor",
            id,
        }))?;
    Ok(())
}
