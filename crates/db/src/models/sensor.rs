//! Sensor registry models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storewatch_core::types::{DbId, Timestamp};

/// A row from the `sensors` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Sensor {
    pub id: DbId,
    pub hub_id: DbId,
    pub sensor_type_id: DbId,
    pub site_id: DbId,
    /// Storage unit the sensor is mounted in, if any (host-app identifier).
    pub unit_id: Option<DbId>,
    pub name: String,
    pub serial_number: String,
    /// `active` or `offline`; derived from `last_reading_at` staleness.
    pub status: String,
    /// Alerting bounds overriding the type defaults when present.
    pub alert_min: Option<f64>,
    pub alert_max: Option<f64>,
    pub alerts_enabled: bool,
    pub reading_interval_secs: i32,
    pub battery_level: Option<f64>,
    pub last_value: Option<f64>,
    pub last_reading_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A sensor joined with its type defaults and owning hub, fetched once per
/// ingested reading so the hot path does a single lookup.
#[derive(Debug, Clone, FromRow)]
pub struct SensorContext {
    pub id: DbId,
    pub hub_id: DbId,
    pub sensor_type_id: DbId,
    pub tenant_id: DbId,
    pub site_id: DbId,
    pub unit_id: Option<DbId>,
    pub name: String,
    pub serial_number: String,
    pub status: String,
    pub alert_min: Option<f64>,
    pub alert_max: Option<f64>,
    pub alerts_enabled: bool,
    pub reading_interval_secs: i32,
    pub type_slug: String,
    pub type_unit: String,
    pub default_alert_min: Option<f64>,
    pub default_alert_max: Option<f64>,
    pub supports_aggregation: bool,
}

/// DTO for registering a sensor under a hub.
///
/// `site_id` is inherited from the hub at insert time so the two can never
/// disagree.
#[derive(Debug, Deserialize)]
pub struct CreateSensor {
    pub hub_id: DbId,
    pub sensor_type_id: DbId,
    pub unit_id: Option<DbId>,
    pub name: String,
    pub serial_number: String,
    pub alert_min: Option<f64>,
    pub alert_max: Option<f64>,
    pub alerts_enabled: Option<bool>,
    pub reading_interval_secs: Option<i32>,
}

/// DTO for patching a sensor (threshold overrides, rebinding, cadence).
#[derive(Debug, Deserialize)]
pub struct UpdateSensor {
    pub name: Option<String>,
    pub unit_id: Option<DbId>,
    pub alert_min: Option<f64>,
    pub alert_max: Option<f64>,
    pub alerts_enabled: Option<bool>,
    pub reading_interval_secs: Option<i32>,
}
