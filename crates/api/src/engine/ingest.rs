//! The reading ingest path.
//!
//! One reading flows: resolve sensor, validate value, classify anomaly,
//! persist, refresh the sensor's cache columns, then hand off to the rule
//! evaluator. Anomalous values are stored and flagged, never rejected; only
//! an unknown sensor or a non-finite value rejects a reading.

use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use storewatch_core::error::CoreError;
use storewatch_core::reading::{validate_value, EffectiveRange};
use storewatch_db::models::alert::Alert;
use storewatch_db::models::reading::{IngestBatch, IngestReading, Reading};
use storewatch_db::repositories::{ReadingRepo, SensorRepo};
use storewatch_events::EventBus;

use crate::error::AppError;

/// Hard cap on readings per batch push.
pub const MAX_BATCH_SIZE: usize = 1000;

/// Result of ingesting a single reading.
#[derive(Debug, Serialize)]
pub struct IngestOutcome {
    /// The stored reading, anomaly flag included.
    pub reading: Reading,
    /// Alerts raised by rule evaluation (empty when none fired).
    pub alerts: Vec<Alert>,
}

/// One rejected item from a batch push.
#[derive(Debug, Serialize)]
pub struct RejectedReading {
    /// Position of the item in the submitted batch.
    pub index: usize,
    pub error: String,
}

/// Result of a batch push: items succeed and fail independently.
#[derive(Debug, Serialize)]
pub struct BatchOutcome {
    pub accepted: i64,
    pub rejected: Vec<RejectedReading>,
}

/// Ingest a single reading.
///
/// The sensor may be addressed by id or by serial number; an unknown sensor
/// rejects the reading with nothing persisted. On success the returned
/// outcome carries the stored row and any alerts the evaluator raised.
pub async fn ingest_one(
    pool: &PgPool,
    bus: &EventBus,
    item: &IngestReading,
) -> Result<IngestOutcome, AppError> {
    let ctx = match (item.sensor_id, item.sensor_serial.as_deref()) {
        (Some(id), _) => SensorRepo::get_context(pool, id).await?,
        (None, Some(serial)) => SensorRepo::get_context_by_serial(pool, serial).await?,
        (None, None) => {
            return Err(AppError::BadRequest(
                "Either sensor_id or sensor_serial must be provided".to_string(),
            ))
        }
    };
    let ctx = ctx.ok_or_else(|| CoreError::UnknownSensor(sensor_identity(item)))?;

    validate_value(item.value).map_err(AppError::Core)?;

    let recorded_at = item.recorded_at.unwrap_or_else(Utc::now);
    let range = EffectiveRange::resolve(
        ctx.alert_min,
        ctx.alert_max,
        ctx.default_alert_min,
        ctx.default_alert_max,
    );
    let is_anomaly = range.is_anomaly(item.value);

    let mut reading = ReadingRepo::insert(pool, ctx.id, item.value, recorded_at, is_anomaly).await?;
    SensorRepo::update_reading_cache(pool, ctx.id, item.value, recorded_at, item.battery_level)
        .await?;

    if is_anomaly {
        tracing::debug!(
            sensor_id = ctx.id,
            value = item.value,
            "Reading outside effective range, stored as anomaly"
        );
    }

    let alerts = super::evaluate::evaluate_reading(pool, bus, &ctx, &reading).await?;
    if !alerts.is_empty() {
        // The evaluator flipped the row's flag after the insert; mirror it
        // on the copy we return.
        reading.triggered_alert = true;
    }

    Ok(IngestOutcome { reading, alerts })
}

/// Ingest a hub-buffered batch.
///
/// Validation failures reject only the offending item; a database failure
/// aborts the whole batch since later items would fail the same way.
pub async fn ingest_batch(
    pool: &PgPool,
    bus: &EventBus,
    batch: &IngestBatch,
) -> Result<BatchOutcome, AppError> {
    if batch.readings.len() > MAX_BATCH_SIZE {
        return Err(AppError::BadRequest(format!(
            "Batch exceeds maximum of {MAX_BATCH_SIZE} readings (got {})",
            batch.readings.len()
        )));
    }

    let mut accepted = 0_i64;
    let mut rejected = Vec::new();

    for (index, item) in batch.readings.iter().enumerate() {
        match ingest_one(pool, bus, item).await {
            Ok(_) => accepted += 1,
            Err(AppError::Database(e)) => return Err(AppError::Database(e)),
            Err(e) => rejected.push(RejectedReading {
                index,
                error: e.to_string(),
            }),
        }
    }

    Ok(BatchOutcome { accepted, rejected })
}

/// How the caller addressed the sensor, for the rejection message.
fn sensor_identity(item: &IngestReading) -> String {
    match (item.sensor_id, item.sensor_serial.as_deref()) {
        (Some(id), _) => format!("id {id}"),
        (None, Some(serial)) => format!("serial '{serial}'"),
        (None, None) => "unspecified".to_string(),
    }
}
