//! Repository for the `sensors` table.

use sqlx::PgPool;
use storewatch_core::types::{DbId, Timestamp};

use crate::models::sensor::{CreateSensor, Sensor, SensorContext, UpdateSensor};

/// Column list for `sensors` SELECT queries.
const COLUMNS: &str = "\
    id, hub_id, sensor_type_id, site_id, unit_id, name, serial_number, status, \
    alert_min, alert_max, alerts_enabled, reading_interval_secs, \
    battery_level, last_value, last_reading_at, created_at, updated_at";

/// Joined projection used by the ingestion hot path: the sensor, its type
/// defaults, and the owning hub's tenant in one query.
const CONTEXT_COLUMNS: &str = "\
    s.id, s.hub_id, s.sensor_type_id, h.tenant_id, s.site_id, s.unit_id, \
    s.name, s.serial_number, s.status, s.alert_min, s.alert_max, \
    s.alerts_enabled, s.reading_interval_secs, \
    t.slug AS type_slug, t.unit AS type_unit, \
    t.default_alert_min, t.default_alert_max, t.supports_aggregation";

const CONTEXT_FROM: &str = "\
    FROM sensors s \
    JOIN hubs h ON h.id = s.hub_id \
    JOIN sensor_types t ON t.id = s.sensor_type_id";

/// Provides query operations for sensors.
pub struct SensorRepo;

impl SensorRepo {
    /// Register a sensor under a hub, inheriting the hub's `site_id`.
    ///
    /// Returns `None` when the hub does not exist.
    pub async fn create(
        pool: &PgPool,
        sensor: &CreateSensor,
    ) -> Result<Option<Sensor>, sqlx::Error> {
        let query = format!(
            "INSERT INTO sensors \
             (hub_id, sensor_type_id, site_id, unit_id, name, serial_number, \
              alert_min, alert_max, alerts_enabled, reading_interval_secs) \
             SELECT h.id, $2, h.site_id, $3, $4, $5, $6, $7, COALESCE($8, TRUE), COALESCE($9, 300) \
             FROM hubs h WHERE h.id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sensor>(&query)
            .bind(sensor.hub_id)
            .bind(sensor.sensor_type_id)
            .bind(sensor.unit_id)
            .bind(&sensor.name)
            .bind(&sensor.serial_number)
            .bind(sensor.alert_min)
            .bind(sensor.alert_max)
            .bind(sensor.alerts_enabled)
            .bind(sensor.reading_interval_secs)
            .fetch_optional(pool)
            .await
    }

    /// Get a sensor by id.
    pub async fn get(pool: &PgPool, id: DbId) -> Result<Option<Sensor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sensors WHERE id = $1");
        sqlx::query_as::<_, Sensor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Get the ingestion context for a sensor by id.
    pub async fn get_context(pool: &PgPool, id: DbId) -> Result<Option<SensorContext>, sqlx::Error> {
        let query = format!("SELECT {CONTEXT_COLUMNS} {CONTEXT_FROM} WHERE s.id = $1");
        sqlx::query_as::<_, SensorContext>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Get the ingestion context for a sensor by device serial.
    pub async fn get_context_by_serial(
        pool: &PgPool,
        serial: &str,
    ) -> Result<Option<SensorContext>, sqlx::Error> {
        let query = format!("SELECT {CONTEXT_COLUMNS} {CONTEXT_FROM} WHERE s.serial_number = $1");
        sqlx::query_as::<_, SensorContext>(&query)
            .bind(serial)
            .fetch_optional(pool)
            .await
    }

    /// List sensors, optionally filtered by site and/or status.
    pub async fn list(
        pool: &PgPool,
        site_id: Option<DbId>,
        status: Option<&str>,
    ) -> Result<Vec<Sensor>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sensors \
             WHERE ($1::bigint IS NULL OR site_id = $1) \
               AND ($2::text IS NULL OR status = $2) \
             ORDER BY site_id, name"
        );
        sqlx::query_as::<_, Sensor>(&query)
            .bind(site_id)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// Patch mutable sensor fields (overrides, rebinding, cadence).
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        update: &UpdateSensor,
    ) -> Result<Option<Sensor>, sqlx::Error> {
        let query = format!(
            "UPDATE sensors SET \
                name = COALESCE($2, name), \
                unit_id = COALESCE($3, unit_id), \
                alert_min = COALESCE($4, alert_min), \
                alert_max = COALESCE($5, alert_max), \
                alerts_enabled = COALESCE($6, alerts_enabled), \
                reading_interval_secs = COALESCE($7, reading_interval_secs), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sensor>(&query)
            .bind(id)
            .bind(update.name.as_deref())
            .bind(update.unit_id)
            .bind(update.alert_min)
            .bind(update.alert_max)
            .bind(update.alerts_enabled)
            .bind(update.reading_interval_secs)
            .fetch_optional(pool)
            .await
    }

    /// Refresh the last-known cache after a reading. Any reading revives an
    /// `offline` sensor.
    pub async fn update_reading_cache(
        pool: &PgPool,
        id: DbId,
        value: f64,
        recorded_at: Timestamp,
        battery_level: Option<f64>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sensors SET \
                last_value = $2, last_reading_at = $3, \
                battery_level = COALESCE($4, battery_level), \
                status = 'active', updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(value)
        .bind(recorded_at)
        .bind(battery_level)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// All sensors currently marked `active`, for the staleness sweep.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Sensor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sensors WHERE status = 'active'");
        sqlx::query_as::<_, Sensor>(&query).fetch_all(pool).await
    }

    /// Demote the given sensors to `offline`. Returns the number demoted.
    pub async fn mark_offline(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "UPDATE sensors SET status = 'offline', updated_at = now() \
             WHERE id = ANY($1) AND status = 'active'",
        )
        .bind(ids)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Ids of sensors whose type supports numeric aggregation, for the
    /// rollup batch.
    pub async fn list_aggregatable_ids(pool: &PgPool) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT s.id FROM sensors s \
             JOIN sensor_types t ON t.id = s.sensor_type_id \
             WHERE t.supports_aggregation \
             ORDER BY s.id",
        )
        .fetch_all(pool)
        .await
    }

    /// Sensor counts per status for one site, for the overview endpoint.
    pub async fn count_by_status(
        pool: &PgPool,
        site_id: DbId,
    ) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM sensors \
             WHERE site_id = $1 \
             GROUP BY status ORDER BY status",
        )
        .bind(site_id)
        .fetch_all(pool)
        .await
    }
}
