//! Threshold rule evaluation for a freshly persisted reading.
//!
//! Runs synchronously on the ingest path: fetches the candidate rules for
//! the sensor, matches the value against each, and raises alerts through the
//! cooldown-guarded repository insert. Misconfigured rules are skipped, not
//! errors; a suppressed duplicate is expected behaviour.

use sqlx::PgPool;
use storewatch_core::rules::{alert_message, RuleCondition};
use storewatch_db::models::alert::{Alert, NewAlert};
use storewatch_db::models::reading::Reading;
use storewatch_db::models::sensor::SensorContext;
use storewatch_db::repositories::{AlertRepo, AlertRuleRepo, ReadingRepo};
use storewatch_events::{channel_names, AlertEvent, EventBus};

/// Evaluate one reading against all active rules for its sensor.
///
/// Returns the alerts that were raised (empty when nothing matched or every
/// match fell inside a cooldown window). When at least one alert is raised
/// the reading's `triggered_alert` flag is set and an [`AlertEvent`] is
/// published per alert.
///
/// Sensors with `alerts_enabled = false` are never evaluated.
pub async fn evaluate_reading(
    pool: &PgPool,
    bus: &EventBus,
    ctx: &SensorContext,
    reading: &Reading,
) -> Result<Vec<Alert>, sqlx::Error> {
    if !ctx.alerts_enabled {
        return Ok(Vec::new());
    }

    let rules = AlertRuleRepo::candidates_for(pool, ctx.tenant_id, ctx.sensor_type_id).await?;
    let mut raised = Vec::new();

    for rule in rules {
        let Some(threshold) = rule.threshold_value else {
            tracing::warn!(
                rule_id = rule.id,
                rule_name = %rule.name,
                "Rule has no threshold, skipping"
            );
            continue;
        };
        let condition: RuleCondition = match rule.condition.parse() {
            Ok(condition) => condition,
            Err(_) => {
                tracing::warn!(
                    rule_id = rule.id,
                    rule_name = %rule.name,
                    condition = %rule.condition,
                    "Rule has an unknown condition, skipping"
                );
                continue;
            }
        };

        if !condition.matches(reading.value, threshold) {
            continue;
        }

        let new_alert = NewAlert {
            tenant_id: ctx.tenant_id,
            sensor_id: ctx.id,
            rule_id: Some(rule.id),
            reading_id: Some(reading.id),
            site_id: ctx.site_id,
            alert_type: condition.alert_type().as_str().to_string(),
            severity: rule.severity.clone(),
            message: alert_message(&ctx.name, &ctx.type_unit, condition, reading.value, threshold),
            trigger_value: Some(reading.value),
            threshold_value: Some(threshold),
        };

        match AlertRepo::create_if_outside_cooldown(pool, &new_alert, rule.cooldown_minutes).await? {
            Some(alert) => {
                tracing::info!(
                    alert_id = alert.id,
                    sensor_id = ctx.id,
                    rule_id = rule.id,
                    value = reading.value,
                    threshold,
                    "Alert raised"
                );
                bus.publish(AlertEvent {
                    alert_id: alert.id,
                    tenant_id: alert.tenant_id,
                    sensor_id: alert.sensor_id,
                    site_id: alert.site_id,
                    alert_type: alert.alert_type.clone(),
                    severity: alert.severity.clone(),
                    message: alert.message.clone(),
                    trigger_value: alert.trigger_value,
                    threshold_value: alert.threshold_value,
                    channels: channel_names(&rule.notification_channels),
                    timestamp: alert.created_at,
                });
                raised.push(alert);
            }
            None => {
                tracing::debug!(
                    sensor_id = ctx.id,
                    rule_id = rule.id,
                    cooldown_minutes = rule.cooldown_minutes,
                    "Alert suppressed by cooldown"
                );
            }
        }
    }

    if !raised.is_empty() {
        ReadingRepo::mark_triggered_alert(pool, reading.id).await?;
    }

    Ok(raised)
}
