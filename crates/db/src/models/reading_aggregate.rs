//! Reading aggregate (rollup) models.

use serde::Serialize;
use sqlx::FromRow;
use storewatch_core::types::{DbId, Timestamp};

/// A row from the `reading_aggregates` table: one rollup per
/// `(sensor_id, period_kind, period_start)`, replaced wholesale on
/// recomputation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReadingAggregate {
    pub id: DbId,
    pub sensor_id: DbId,
    /// `hourly`, `daily`, `weekly` or `monthly`.
    pub period_kind: String,
    pub period_start: Timestamp,
    pub period_end: Timestamp,
    pub min_value: f64,
    pub max_value: f64,
    pub avg_value: f64,
    pub reading_count: i64,
    pub anomaly_count: i64,
    /// Alerts created against the sensor inside the period.
    pub alert_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
