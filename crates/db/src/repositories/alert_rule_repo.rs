//! Repository for the `alert_rules` table.

use sqlx::PgPool;
use storewatch_core::types::DbId;

use crate::models::alert_rule::{AlertRule, CreateAlertRule, UpdateAlertRule};

/// Column list for `alert_rules` SELECT queries.
const COLUMNS: &str = "\
    id, tenant_id, sensor_type_id, name, condition, threshold_value, \
    severity, notification_channels, cooldown_minutes, is_active, \
    created_at, updated_at";

/// Provides query operations for alert rules.
pub struct AlertRuleRepo;

impl AlertRuleRepo {
    /// Create a rule. Severity defaults to `warning`, channels to
    /// `["email"]`, cooldown to 60 minutes.
    pub async fn create(
        pool: &PgPool,
        rule: &CreateAlertRule,
    ) -> Result<AlertRule, sqlx::Error> {
        let query = format!(
            "INSERT INTO alert_rules \
             (tenant_id, sensor_type_id, name, condition, threshold_value, \
              severity, notification_channels, cooldown_minutes, is_active) \
             VALUES ($1, $2, $3, $4, $5, \
                     COALESCE($6, 'warning'), COALESCE($7, '[\"email\"]'::jsonb), \
                     COALESCE($8, 60), COALESCE($9, TRUE)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AlertRule>(&query)
            .bind(rule.tenant_id)
            .bind(rule.sensor_type_id)
            .bind(&rule.name)
            .bind(&rule.condition)
            .bind(rule.threshold_value)
            .bind(rule.severity.as_deref())
            .bind(rule.notification_channels.as_ref())
            .bind(rule.cooldown_minutes)
            .bind(rule.is_active)
            .fetch_one(pool)
            .await
    }

    /// Get a rule by id.
    pub async fn get(pool: &PgPool, id: DbId) -> Result<Option<AlertRule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM alert_rules WHERE id = $1");
        sqlx::query_as::<_, AlertRule>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List rules, optionally narrowed to one tenant.
    pub async fn list(
        pool: &PgPool,
        tenant_id: Option<DbId>,
    ) -> Result<Vec<AlertRule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alert_rules \
             WHERE ($1::bigint IS NULL OR tenant_id = $1) \
             ORDER BY tenant_id, name"
        );
        sqlx::query_as::<_, AlertRule>(&query)
            .bind(tenant_id)
            .fetch_all(pool)
            .await
    }

    /// Patch mutable rule fields.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        update: &UpdateAlertRule,
    ) -> Result<Option<AlertRule>, sqlx::Error> {
        let query = format!(
            "UPDATE alert_rules SET \
                name = COALESCE($2, name), \
                sensor_type_id = COALESCE($3, sensor_type_id), \
                condition = COALESCE($4, condition), \
                threshold_value = COALESCE($5, threshold_value), \
                severity = COALESCE($6, severity), \
                notification_channels = COALESCE($7, notification_channels), \
                cooldown_minutes = COALESCE($8, cooldown_minutes), \
                is_active = COALESCE($9, is_active), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AlertRule>(&query)
            .bind(id)
            .bind(update.name.as_deref())
            .bind(update.sensor_type_id)
            .bind(update.condition.as_deref())
            .bind(update.threshold_value)
            .bind(update.severity.as_deref())
            .bind(update.notification_channels.as_ref())
            .bind(update.cooldown_minutes)
            .bind(update.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete a rule. Existing alerts keep a NULL `rule_id` via the FK.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM alert_rules WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Active rules that apply to a reading from the given tenant and sensor
    /// type: type-scoped matches plus tenant-wide globals.
    pub async fn candidates_for(
        pool: &PgPool,
        tenant_id: DbId,
        sensor_type_id: DbId,
    ) -> Result<Vec<AlertRule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alert_rules \
             WHERE tenant_id = $1 \
               AND is_active \
               AND (sensor_type_id IS NULL OR sensor_type_id = $2) \
             ORDER BY id"
        );
        sqlx::query_as::<_, AlertRule>(&query)
            .bind(tenant_id)
            .bind(sensor_type_id)
            .fetch_all(pool)
            .await
    }
}
