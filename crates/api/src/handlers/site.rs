//! Handlers for per-site overview queries.
//!
//! Sites are foreign identifiers owned by the host application, so there is
//! no site CRUD here; the overview aggregates what this service knows about
//! a site's fleet.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::json;
use storewatch_core::types::DbId;
use storewatch_db::repositories::{AlertRepo, SensorRepo};

use crate::error::AppResult;
use crate::state::AppState;

/// GET /api/v1/sites/{id}/overview
///
/// Sensor counts by status and unresolved alert counts by severity for one
/// site. A site with no registered fleet returns zero counts rather than a
/// 404, since site ids are not ours to validate.
pub async fn overview(
    State(state): State<AppState>,
    Path(site_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let sensor_counts = SensorRepo::count_by_status(&state.pool, site_id).await?;
    let alert_counts = AlertRepo::count_open_by_severity(&state.pool, site_id).await?;

    let sensor_total: i64 = sensor_counts.iter().map(|(_, n)| n).sum();
    let alert_total: i64 = alert_counts.iter().map(|(_, n)| n).sum();

    let by_status: serde_json::Map<String, serde_json::Value> = sensor_counts
        .into_iter()
        .map(|(status, n)| (status, json!(n)))
        .collect();
    let by_severity: serde_json::Map<String, serde_json::Value> = alert_counts
        .into_iter()
        .map(|(severity, n)| (severity, json!(n)))
        .collect();

    Ok(Json(json!({
        "data": {
            "site_id": site_id,
            "sensors": {
                "total": sensor_total,
                "by_status": by_status,
            },
            "open_alerts": {
                "total": alert_total,
                "by_severity": by_severity,
            },
        }
    })))
}
