//! Periodic hub and sensor staleness sweep.
//!
//! Hubs that missed several heartbeats are demoted to `offline`; sensors
//! silent past their own grace window are demoted independently (hub state
//! never cascades). Each newly stale sensor raises a `sensor_offline`
//! warning alert, deduped against one already open, and the alert is
//! published to the notification dispatcher.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use storewatch_core::alert::{AlertType, Severity};
use storewatch_core::health::{is_stale, HUB_GRACE_MULTIPLE, SENSOR_GRACE_MULTIPLE};
use storewatch_core::types::Timestamp;
use storewatch_db::models::alert::NewAlert;
use storewatch_db::models::sensor::Sensor;
use storewatch_db::repositories::{AlertRepo, HubRepo, SensorRepo};
use storewatch_events::{AlertEvent, EventBus};
use tokio_util::sync::CancellationToken;

/// Channels for sweep-raised alerts, which have no rule to configure them.
const OFFLINE_ALERT_CHANNELS: &[&str] = &["email"];

/// Counters for one sweep pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepStats {
    pub hubs_marked_offline: u64,
    pub sensors_marked_offline: u64,
    pub alerts_raised: u64,
}

/// Run the staleness sweep loop until `cancel` is triggered.
pub async fn run(pool: PgPool, bus: Arc<EventBus>, tick: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = tick.as_secs(), "Health sweep started");

    let mut interval = tokio::time::interval(tick);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Health sweep stopping");
                break;
            }
            _ = interval.tick() => {
                match sweep_once(&pool, &bus, Utc::now()).await {
                    Ok(stats) if stats.hubs_marked_offline > 0
                        || stats.sensors_marked_offline > 0 =>
                    {
                        tracing::info!(
                            hubs = stats.hubs_marked_offline,
                            sensors = stats.sensors_marked_offline,
                            alerts = stats.alerts_raised,
                            "Health sweep demoted stale devices"
                        );
                    }
                    Ok(_) => {
                        tracing::debug!("Health sweep found nothing stale");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Health sweep failed");
                    }
                }
            }
        }
    }
}

/// One sweep pass against the clock value `now`.
pub async fn sweep_once(
    pool: &PgPool,
    bus: &EventBus,
    now: Timestamp,
) -> Result<SweepStats, sqlx::Error> {
    let mut stats = SweepStats::default();

    let stale_hub_ids: Vec<_> = HubRepo::list_online(pool)
        .await?
        .into_iter()
        .filter(|h| {
            is_stale(
                h.last_seen_at,
                now,
                i64::from(h.heartbeat_interval_secs),
                HUB_GRACE_MULTIPLE,
            )
        })
        .map(|h| h.id)
        .collect();
    stats.hubs_marked_offline = HubRepo::mark_offline(pool, &stale_hub_ids).await?;

    let stale_sensors: Vec<Sensor> = SensorRepo::list_active(pool)
        .await?
        .into_iter()
        .filter(|s| {
            is_stale(
                s.last_reading_at,
                now,
                i64::from(s.reading_interval_secs),
                SENSOR_GRACE_MULTIPLE,
            )
        })
        .collect();
    let stale_sensor_ids: Vec<_> = stale_sensors.iter().map(|s| s.id).collect();
    stats.sensors_marked_offline = SensorRepo::mark_offline(pool, &stale_sensor_ids).await?;

    for sensor in &stale_sensors {
        match raise_offline_alert(pool, bus, sensor).await {
            Ok(true) => stats.alerts_raised += 1,
            Ok(false) => {}
            Err(e) => {
                tracing::error!(
                    sensor_id = sensor.id,
                    error = %e,
                    "Failed to raise offline alert, continuing sweep"
                );
            }
        }
    }

    Ok(stats)
}

/// Open a `sensor_offline` alert for a newly stale sensor unless one is
/// already open. Returns whether a new alert was created.
async fn raise_offline_alert(
    pool: &PgPool,
    bus: &EventBus,
    sensor: &Sensor,
) -> Result<bool, sqlx::Error> {
    // The sensor row has no tenant column; fetch the joined context for it.
    let Some(ctx) = SensorRepo::get_context(pool, sensor.id).await? else {
        return Ok(false);
    };

    let silent_minutes = i64::from(ctx.reading_interval_secs) * SENSOR_GRACE_MULTIPLE / 60;
    let new_alert = NewAlert {
        tenant_id: ctx.tenant_id,
        sensor_id: ctx.id,
        rule_id: None,
        reading_id: None,
        site_id: ctx.site_id,
        alert_type: AlertType::SensorOffline.as_str().to_string(),
        severity: Severity::Warning.as_str().to_string(),
        message: format!(
            "{}: no reading received for over {silent_minutes} minutes",
            ctx.name
        ),
        trigger_value: None,
        threshold_value: None,
    };

    let Some(alert) = AlertRepo::create_offline_alert_if_absent(pool, &new_alert).await? else {
        return Ok(false);
    };

    tracing::info!(
        alert_id = alert.id,
        sensor_id = ctx.id,
        "Sensor offline alert raised"
    );
    bus.publish(AlertEvent {
        alert_id: alert.id,
        tenant_id: alert.tenant_id,
        sensor_id: alert.sensor_id,
        site_id: alert.site_id,
        alert_type: alert.alert_type.clone(),
        severity: alert.severity.clone(),
        message: alert.message.clone(),
        trigger_value: None,
        threshold_value: None,
        channels: OFFLINE_ALERT_CHANNELS.iter().map(|c| c.to_string()).collect(),
        timestamp: alert.created_at,
    });

    Ok(true)
}
