//! Sensor type catalog models.

use serde::Serialize;
use sqlx::FromRow;
use storewatch_core::types::{DbId, Timestamp};

/// A row from the `sensor_types` table.
///
/// Catalog entries are immutable reference data: sensors point at them, the
/// engine reads their defaults, nothing mutates them after creation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SensorType {
    pub id: DbId,
    pub slug: String,
    pub name: String,
    /// Display unit (e.g. `°C`, `%`, `ppm`); empty for binary sensors.
    pub unit: String,
    /// Physical measurement range of the hardware.
    pub min_value: f64,
    pub max_value: f64,
    /// Default alerting bounds; overridable per sensor.
    pub default_alert_min: Option<f64>,
    pub default_alert_max: Option<f64>,
    /// Whether min/max/avg rollups are meaningful for this type.
    pub supports_aggregation: bool,
    pub created_at: Timestamp,
}
