//! Repository for the `reading_aggregates` table.

use sqlx::PgPool;
use storewatch_core::aggregation::AggregateSummary;
use storewatch_core::types::{DbId, Timestamp};

use crate::models::reading_aggregate::ReadingAggregate;

/// Column list for `reading_aggregates` SELECT queries.
const COLUMNS: &str = "\
    id, sensor_id, period_kind, period_start, period_end, \
    min_value, max_value, avg_value, reading_count, anomaly_count, alert_count, \
    created_at, updated_at";

/// Provides query operations for reading aggregates.
pub struct ReadingAggregateRepo;

impl ReadingAggregateRepo {
    /// Write the rollup for one `(sensor, period_kind, period_start)` window,
    /// replacing every value column if the row already exists. Reruns are
    /// therefore idempotent.
    #[allow(clippy::too_many_arguments)]
    pub async fn upsert(
        pool: &PgPool,
        sensor_id: DbId,
        period_kind: &str,
        period_start: Timestamp,
        period_end: Timestamp,
        summary: &AggregateSummary,
        alert_count: i64,
    ) -> Result<ReadingAggregate, sqlx::Error> {
        let query = format!(
            "INSERT INTO reading_aggregates \
             (sensor_id, period_kind, period_start, period_end, \
              min_value, max_value, avg_value, reading_count, anomaly_count, alert_count) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (sensor_id, period_kind, period_start) DO UPDATE SET \
                period_end = EXCLUDED.period_end, \
                min_value = EXCLUDED.min_value, \
                max_value = EXCLUDED.max_value, \
                avg_value = EXCLUDED.avg_value, \
                reading_count = EXCLUDED.reading_count, \
                anomaly_count = EXCLUDED.anomaly_count, \
                alert_count = EXCLUDED.alert_count, \
                updated_at = now() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReadingAggregate>(&query)
            .bind(sensor_id)
            .bind(period_kind)
            .bind(period_start)
            .bind(period_end)
            .bind(summary.min_value)
            .bind(summary.max_value)
            .bind(summary.avg_value)
            .bind(summary.reading_count)
            .bind(summary.anomaly_count)
            .bind(alert_count)
            .fetch_one(pool)
            .await
    }

    /// Rollup history for a sensor, oldest first, optionally narrowed to one
    /// period kind and/or a time range over `period_start`.
    pub async fn list_for_sensor(
        pool: &PgPool,
        sensor_id: DbId,
        period_kind: Option<&str>,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) -> Result<Vec<ReadingAggregate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reading_aggregates \
             WHERE sensor_id = $1 \
               AND ($2::text IS NULL OR period_kind = $2) \
               AND ($3::timestamptz IS NULL OR period_start >= $3) \
               AND ($4::timestamptz IS NULL OR period_start < $4) \
             ORDER BY period_start"
        );
        sqlx::query_as::<_, ReadingAggregate>(&query)
            .bind(sensor_id)
            .bind(period_kind)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
    }

    /// Fetch a single rollup window, if computed.
    pub async fn get_window(
        pool: &PgPool,
        sensor_id: DbId,
        period_kind: &str,
        period_start: Timestamp,
    ) -> Result<Option<ReadingAggregate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reading_aggregates \
             WHERE sensor_id = $1 AND period_kind = $2 AND period_start = $3"
        );
        sqlx::query_as::<_, ReadingAggregate>(&query)
            .bind(sensor_id)
            .bind(period_kind)
            .bind(period_start)
            .fetch_optional(pool)
            .await
    }
}
