//! Repository for the `hubs` table.

use sqlx::PgPool;
use storewatch_core::types::DbId;

use crate::models::hub::{CreateHub, Hub};

/// Column list for `hubs` SELECT queries.
const COLUMNS: &str = "\
    id, tenant_id, site_id, name, serial_number, connection_type, status, \
    firmware_version, heartbeat_interval_secs, last_seen_at, created_at, updated_at";

/// Provides query operations for hubs.
pub struct HubRepo;

impl HubRepo {
    /// Register a hub. Status starts `offline` until the first heartbeat.
    pub async fn create(pool: &PgPool, hub: &CreateHub) -> Result<Hub, sqlx::Error> {
        let query = format!(
            "INSERT INTO hubs \
             (tenant_id, site_id, name, serial_number, connection_type, heartbeat_interval_secs) \
             VALUES ($1, $2, $3, $4, COALESCE($5, 'wifi'), COALESCE($6, 60)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Hub>(&query)
            .bind(hub.tenant_id)
            .bind(hub.site_id)
            .bind(&hub.name)
            .bind(&hub.serial_number)
            .bind(hub.connection_type.as_deref())
            .bind(hub.heartbeat_interval_secs)
            .fetch_one(pool)
            .await
    }

    /// Get a hub by id.
    pub async fn get(pool: &PgPool, id: DbId) -> Result<Option<Hub>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM hubs WHERE id = $1");
        sqlx::query_as::<_, Hub>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List hubs, optionally restricted to one site.
    pub async fn list(pool: &PgPool, site_id: Option<DbId>) -> Result<Vec<Hub>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM hubs \
             WHERE ($1::bigint IS NULL OR site_id = $1) \
             ORDER BY site_id, name"
        );
        sqlx::query_as::<_, Hub>(&query)
            .bind(site_id)
            .fetch_all(pool)
            .await
    }

    /// Record a heartbeat: refresh `last_seen_at`, force `online`, and keep
    /// the reported firmware if the hub sent one.
    pub async fn record_heartbeat(
        pool: &PgPool,
        id: DbId,
        firmware_version: Option<&str>,
    ) -> Result<Option<Hub>, sqlx::Error> {
        let query = format!(
            "UPDATE hubs \
             SET last_seen_at = now(), status = 'online', \
                 firmware_version = COALESCE($2, firmware_version), updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Hub>(&query)
            .bind(id)
            .bind(firmware_version)
            .fetch_optional(pool)
            .await
    }

    /// All hubs currently marked `online`, for the staleness sweep.
    pub async fn list_online(pool: &PgPool) -> Result<Vec<Hub>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM hubs WHERE status = 'online'");
        sqlx::query_as::<_, Hub>(&query).fetch_all(pool).await
    }

    /// Demote the given hubs to `offline`. Returns the number demoted.
    pub async fn mark_offline(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "UPDATE hubs SET status = 'offline', updated_at = now() \
             WHERE id = ANY($1) AND status = 'online'",
        )
        .bind(ids)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
