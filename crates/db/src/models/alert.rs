//! Alert models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storewatch_core::types::{DbId, Timestamp};

/// A row from the `alerts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Alert {
    pub id: DbId,
    pub tenant_id: DbId,
    pub sensor_id: DbId,
    /// Rule that raised the alert; `None` for sweep-generated offline alerts.
    pub rule_id: Option<DbId>,
    /// Reading that tripped the rule, when one did.
    pub reading_id: Option<DbId>,
    pub site_id: DbId,
    /// `threshold_exceeded`, `threshold_below` or `sensor_offline`.
    pub alert_type: String,
    pub severity: String,
    pub message: String,
    pub trigger_value: Option<f64>,
    pub threshold_value: Option<f64>,
    /// `active`, `acknowledged` or `resolved`.
    pub status: String,
    pub acknowledged_by: Option<DbId>,
    pub acknowledged_at: Option<Timestamp>,
    pub resolved_by: Option<DbId>,
    pub resolved_at: Option<Timestamp>,
    pub resolution_notes: Option<String>,
    pub notification_sent: bool,
    pub notification_sent_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Insert payload assembled by the evaluator or the health sweep.
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub tenant_id: DbId,
    pub sensor_id: DbId,
    pub rule_id: Option<DbId>,
    pub reading_id: Option<DbId>,
    pub site_id: DbId,
    pub alert_type: String,
    pub severity: String,
    pub message: String,
    pub trigger_value: Option<f64>,
    pub threshold_value: Option<f64>,
}

/// Filters for the alert list surface.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AlertFilter {
    pub status: Option<String>,
    pub severity: Option<String>,
    pub site_id: Option<DbId>,
    pub tenant_id: Option<DbId>,
}

/// DTO for acknowledging an alert.
#[derive(Debug, Deserialize)]
pub struct AcknowledgeRequest {
    pub actor_id: DbId,
}

/// DTO for resolving an alert.
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub actor_id: DbId,
    pub notes: Option<String>,
}
