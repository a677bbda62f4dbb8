//! Reading models (append-only telemetry).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storewatch_core::types::{DbId, Timestamp};

/// A row from the `readings` table. Immutable once stored, except for the
/// one-shot `triggered_alert` flag set by the rule evaluator.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Reading {
    pub id: DbId,
    pub sensor_id: DbId,
    pub value: f64,
    pub recorded_at: Timestamp,
    /// Value fell outside the sensor's effective alert range. Anomalous
    /// readings are stored and flagged, never dropped.
    pub is_anomaly: bool,
    pub triggered_alert: bool,
    pub created_at: Timestamp,
}

/// Wire DTO for a single ingested reading.
///
/// Exactly one of `sensor_id` / `sensor_serial` must identify a registered
/// sensor; an unknown sensor rejects the reading outright.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestReading {
    pub sensor_id: Option<DbId>,
    pub sensor_serial: Option<String>,
    pub value: f64,
    /// Defaults to the ingestion time when the hub does not timestamp.
    pub recorded_at: Option<Timestamp>,
    pub battery_level: Option<f64>,
}

/// Wire DTO for a hub-buffered batch push.
#[derive(Debug, Deserialize)]
pub struct IngestBatch {
    pub readings: Vec<IngestReading>,
}

/// Lean projection used by the aggregation engine; one row per reading in
/// the period window.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct ReadingWindowRow {
    pub value: f64,
    pub is_anomaly: bool,
}
