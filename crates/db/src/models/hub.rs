//! Hub (site gateway) models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storewatch_core::types::{DbId, Timestamp};

/// A row from the `hubs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Hub {
    pub id: DbId,
    pub tenant_id: DbId,
    pub site_id: DbId,
    pub name: String,
    pub serial_number: String,
    /// `wifi`, `ethernet`, `lora` or `cellular`.
    pub connection_type: String,
    /// `online` or `offline`; derived from `last_seen_at` recency.
    pub status: String,
    pub firmware_version: Option<String>,
    /// Expected heartbeat cadence; the sweep demotes the hub after missing
    /// several in a row.
    pub heartbeat_interval_secs: i32,
    pub last_seen_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a hub.
#[derive(Debug, Deserialize)]
pub struct CreateHub {
    pub tenant_id: DbId,
    pub site_id: DbId,
    pub name: String,
    pub serial_number: String,
    pub connection_type: Option<String>,
    pub heartbeat_interval_secs: Option<i32>,
}

/// DTO for a hub heartbeat. A heartbeat always proves liveness; the optional
/// fields refresh reported metadata.
#[derive(Debug, Deserialize)]
pub struct HeartbeatRequest {
    /// Self-reported status; informational only, the hub is set `online`
    /// because the heartbeat itself is the liveness signal.
    pub status: Option<String>,
    pub firmware_version: Option<String>,
}
