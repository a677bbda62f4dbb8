//! Repository for the `alerts` table.
//!
//! Creation goes through guarded inserts: the evaluator's cooldown check and
//! the sweep's open-alert check both live in SQL so that concurrent writers
//! cannot double-fire.

use sqlx::PgPool;
use storewatch_core::paging::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use storewatch_core::types::{DbId, Timestamp};

use crate::models::alert::{Alert, AlertFilter, NewAlert};

/// Column list for `alerts` SELECT queries.
const COLUMNS: &str = "\
    id, tenant_id, sensor_id, rule_id, reading_id, site_id, \
    alert_type, severity, message, trigger_value, threshold_value, \
    status, acknowledged_by, acknowledged_at, resolved_by, resolved_at, \
    resolution_notes, notification_sent, notification_sent_at, created_at";

/// Column list for `alerts` INSERT statements, matching [`NewAlert`] order.
const INSERT_COLUMNS: &str = "\
    tenant_id, sensor_id, rule_id, reading_id, site_id, \
    alert_type, severity, message, trigger_value, threshold_value";

const FILTER_CLAUSE: &str = "\
    ($1::text IS NULL OR status = $1) \
    AND ($2::text IS NULL OR severity = $2) \
    AND ($3::bigint IS NULL OR site_id = $3) \
    AND ($4::bigint IS NULL OR tenant_id = $4)";

/// Provides query operations for alerts.
pub struct AlertRepo;

impl AlertRepo {
    /// Insert a rule-triggered alert unless an unresolved alert for the same
    /// `(sensor, rule)` pair was created within the cooldown window.
    ///
    /// The check and the insert run in one transaction under an advisory
    /// lock on the pair, so two evaluators racing on the same sensor and
    /// rule serialize instead of both inserting. Returns `None` when the
    /// alert was suppressed.
    pub async fn create_if_outside_cooldown(
        pool: &PgPool,
        alert: &NewAlert,
        cooldown_minutes: i32,
    ) -> Result<Option<Alert>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Held until commit. hashtextextended folds the pair into the
        // bigint advisory-lock keyspace.
        sqlx::query(
            "SELECT pg_advisory_xact_lock(\
                hashtextextended($1::text || ':' || COALESCE($2::text, '-'), 0))",
        )
        .bind(alert.sensor_id)
        .bind(alert.rule_id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "INSERT INTO alerts ({INSERT_COLUMNS}) \
             SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, $10 \
             WHERE NOT EXISTS (\
                SELECT 1 FROM alerts \
                WHERE sensor_id = $2 \
                  AND rule_id IS NOT DISTINCT FROM $3 \
                  AND status <> 'resolved' \
                  AND created_at > now() - make_interval(mins => $11)) \
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, Alert>(&query)
            .bind(alert.tenant_id)
            .bind(alert.sensor_id)
            .bind(alert.rule_id)
            .bind(alert.reading_id)
            .bind(alert.site_id)
            .bind(&alert.alert_type)
            .bind(&alert.severity)
            .bind(&alert.message)
            .bind(alert.trigger_value)
            .bind(alert.threshold_value)
            .bind(cooldown_minutes)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(created)
    }

    /// Insert a `sensor_offline` alert unless the sensor already has an open
    /// one. Returns `None` when suppressed.
    pub async fn create_offline_alert_if_absent(
        pool: &PgPool,
        alert: &NewAlert,
    ) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!(
            "INSERT INTO alerts ({INSERT_COLUMNS}) \
             SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, $10 \
             WHERE NOT EXISTS (\
                SELECT 1 FROM alerts \
                WHERE sensor_id = $2 \
                  AND alert_type = 'sensor_offline' \
                  AND status <> 'resolved') \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(alert.tenant_id)
            .bind(alert.sensor_id)
            .bind(alert.rule_id)
            .bind(alert.reading_id)
            .bind(alert.site_id)
            .bind(&alert.alert_type)
            .bind(&alert.severity)
            .bind(&alert.message)
            .bind(alert.trigger_value)
            .bind(alert.threshold_value)
            .fetch_optional(pool)
            .await
    }

    /// Get an alert by id.
    pub async fn get(pool: &PgPool, id: DbId) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM alerts WHERE id = $1");
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List alerts matching the filter, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &AlertFilter,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Alert>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alerts \
             WHERE {FILTER_CLAUSE} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(filter.status.as_deref())
            .bind(filter.severity.as_deref())
            .bind(filter.site_id)
            .bind(filter.tenant_id)
            .bind(clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    /// Total alerts matching the filter, for pagination.
    pub async fn count(pool: &PgPool, filter: &AlertFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM alerts WHERE {FILTER_CLAUSE}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(filter.status.as_deref())
            .bind(filter.severity.as_deref())
            .bind(filter.site_id)
            .bind(filter.tenant_id)
            .fetch_one(pool)
            .await
    }

    /// Move an `active` alert to `acknowledged`, stamping the actor.
    ///
    /// The status guard is part of the UPDATE; `None` means the alert is
    /// missing or not currently `active`, and the caller decides which.
    pub async fn acknowledge(
        pool: &PgPool,
        id: DbId,
        actor_id: DbId,
    ) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!(
            "UPDATE alerts SET \
                status = 'acknowledged', acknowledged_by = $2, acknowledged_at = now() \
             WHERE id = $1 AND status = 'active' \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .bind(actor_id)
            .fetch_optional(pool)
            .await
    }

    /// Move an `active` or `acknowledged` alert to `resolved`, stamping the
    /// actor and optional notes. `None` when missing or already resolved.
    pub async fn resolve(
        pool: &PgPool,
        id: DbId,
        actor_id: DbId,
        notes: Option<&str>,
    ) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!(
            "UPDATE alerts SET \
                status = 'resolved', resolved_by = $2, resolved_at = now(), \
                resolution_notes = $3 \
             WHERE id = $1 AND status IN ('active', 'acknowledged') \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .bind(actor_id)
            .bind(notes)
            .fetch_optional(pool)
            .await
    }

    /// Alerts created against a sensor inside `[start, end)`, for rollups.
    pub async fn count_created_between(
        pool: &PgPool,
        sensor_id: DbId,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM alerts \
             WHERE sensor_id = $1 AND created_at >= $2 AND created_at < $3",
        )
        .bind(sensor_id)
        .bind(start)
        .bind(end)
        .fetch_one(pool)
        .await
    }

    /// Record that notification delivery finished for an alert.
    pub async fn mark_notification_sent(pool: &PgPool, id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE alerts SET notification_sent = TRUE, notification_sent_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Unresolved alert counts per severity for one site, for the overview
    /// endpoint.
    pub async fn count_open_by_severity(
        pool: &PgPool,
        site_id: DbId,
    ) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (String, i64)>(
            "SELECT severity, COUNT(*) FROM alerts \
             WHERE site_id = $1 AND status <> 'resolved' \
             GROUP BY severity ORDER BY severity",
        )
        .bind(site_id)
        .fetch_all(pool)
        .await
    }
}
