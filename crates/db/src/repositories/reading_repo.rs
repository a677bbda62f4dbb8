//! Repository for the append-only `readings` table.

use sqlx::PgPool;
use storewatch_core::paging::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use storewatch_core::types::{DbId, Timestamp};

use crate::models::reading::{Reading, ReadingWindowRow};

/// Column list for `readings` SELECT queries.
const COLUMNS: &str =
    "id, sensor_id, value, recorded_at, is_anomaly, triggered_alert, created_at";

/// Provides query operations for readings.
pub struct ReadingRepo;

impl ReadingRepo {
    /// Persist one reading. Anomaly classification happens before insert;
    /// rows are never updated afterwards except for the alert marker.
    pub async fn insert(
        pool: &PgPool,
        sensor_id: DbId,
        value: f64,
        recorded_at: Timestamp,
        is_anomaly: bool,
    ) -> Result<Reading, sqlx::Error> {
        let query = format!(
            "INSERT INTO readings (sensor_id, value, recorded_at, is_anomaly) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Reading>(&query)
            .bind(sensor_id)
            .bind(value)
            .bind(recorded_at)
            .bind(is_anomaly)
            .fetch_one(pool)
            .await
    }

    /// Flag a reading as having produced an alert.
    pub async fn mark_triggered_alert(pool: &PgPool, id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE readings SET triggered_alert = TRUE WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Page through a sensor's history, newest first, optionally bounded by
    /// a time range.
    pub async fn list_for_sensor(
        pool: &PgPool,
        sensor_id: DbId,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Reading>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM readings \
             WHERE sensor_id = $1 \
               AND ($2::timestamptz IS NULL OR recorded_at >= $2) \
               AND ($3::timestamptz IS NULL OR recorded_at < $3) \
             ORDER BY recorded_at DESC \
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Reading>(&query)
            .bind(sensor_id)
            .bind(from)
            .bind(to)
            .bind(clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    /// Raw samples for one aggregation window: `recorded_at` in
    /// `[start, end)`.
    pub async fn window_samples(
        pool: &PgPool,
        sensor_id: DbId,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<ReadingWindowRow>, sqlx::Error> {
        sqlx::query_as::<_, ReadingWindowRow>(
            "SELECT value, is_anomaly FROM readings \
             WHERE sensor_id = $1 AND recorded_at >= $2 AND recorded_at < $3",
        )
        .bind(sensor_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await
    }

    /// Drop raw readings older than the cutoff. Aggregates are kept, so
    /// history survives in rolled-up form. Returns the number deleted.
    pub async fn delete_older_than(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM readings WHERE recorded_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
