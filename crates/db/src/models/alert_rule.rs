//! Alert rule models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storewatch_core::types::{DbId, Timestamp};

/// A row from the `alert_rules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AlertRule {
    pub id: DbId,
    pub tenant_id: DbId,
    /// `None` makes the rule global: it applies to every sensor type.
    pub sensor_type_id: Option<DbId>,
    pub name: String,
    /// Stored as text; conditions the evaluator cannot parse are skipped as
    /// misconfigured rather than failing ingestion.
    pub condition: String,
    /// Nullable: a rule without a threshold is misconfigured and skipped.
    pub threshold_value: Option<f64>,
    pub severity: String,
    /// JSON array of channel names, e.g. `["email", "webhook"]`.
    pub notification_channels: serde_json::Value,
    pub cooldown_minutes: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an alert rule.
#[derive(Debug, Deserialize)]
pub struct CreateAlertRule {
    pub tenant_id: DbId,
    pub sensor_type_id: Option<DbId>,
    pub name: String,
    pub condition: String,
    pub threshold_value: Option<f64>,
    pub severity: Option<String>,
    pub notification_channels: Option<serde_json::Value>,
    pub cooldown_minutes: Option<i32>,
    pub is_active: Option<bool>,
}

/// DTO for patching an alert rule.
#[derive(Debug, Deserialize)]
pub struct UpdateAlertRule {
    pub name: Option<String>,
    pub sensor_type_id: Option<DbId>,
    pub condition: Option<String>,
    pub threshold_value: Option<f64>,
    pub severity: Option<String>,
    pub notification_channels: Option<serde_json::Value>,
    pub cooldown_minutes: Option<i32>,
    pub is_active: Option<bool>,
}
