//! Handlers for the `/ingest` endpoints, the hot path hubs push telemetry
//! through.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use storewatch_db::models::reading::{IngestBatch, IngestReading};

use crate::engine;
use crate::engine::ingest::{BatchOutcome, IngestOutcome};
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/ingest/reading
///
/// Ingest a single reading. Returns 201 with the stored row (anomaly flag
/// included) and any alerts the evaluation raised; an unknown sensor yields
/// 404 `UNKNOWN_SENSOR` with nothing persisted.
pub async fn ingest_reading(
    State(state): State<AppState>,
    Json(input): Json<IngestReading>,
) -> AppResult<(StatusCode, Json<DataResponse<IngestOutcome>>)> {
    let outcome = engine::ingest::ingest_one(&state.pool, &state.event_bus, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: outcome })))
}

/// POST /api/v1/ingest/readings
///
/// Ingest a hub-buffered batch of up to 1000 readings. Items succeed and
/// fail independently; the response reports the accepted count and each
/// rejection with its batch index.
pub async fn ingest_batch(
    State(state): State<AppState>,
    Json(input): Json<IngestBatch>,
) -> AppResult<Json<DataResponse<BatchOutcome>>> {
    let outcome = engine::ingest::ingest_batch(&state.pool, &state.event_bus, &input).await?;
    Ok(Json(DataResponse { data: outcome }))
}
