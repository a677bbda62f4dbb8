//! Scheduled reading aggregation.
//!
//! Each tick rolls up the current (still-open) and the previous daily
//! window for every sensor whose type supports aggregation. Summaries are
//! complete replacement rows, so re-running a window is idempotent; the
//! still-open window simply converges as readings arrive. A Postgres
//! advisory lease keeps concurrent instances from aggregating the same
//! windows twice.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use storewatch_core::aggregation::{summarize, PeriodKind, ReadingSample};
use storewatch_core::types::{DbId, Timestamp};
use storewatch_db::repositories::{AlertRepo, ReadingAggregateRepo, ReadingRepo, SensorRepo};
use tokio_util::sync::CancellationToken;

/// Advisory lease name; hashed into the lock keyspace on the server.
const LEASE_NAME: &str = "storewatch:aggregation";

/// Counters for one aggregated window.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WindowStats {
    /// Rows written (insert or replacement).
    pub written: u64,
    /// Sensors with no readings in the window; nothing written.
    pub skipped_empty: u64,
    /// Sensors whose rollup failed; logged and skipped.
    pub failed: u64,
}

/// Run the aggregation loop until `cancel` is triggered.
pub async fn run(pool: PgPool, tick: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = tick.as_secs(), "Aggregation job started");

    let mut interval = tokio::time::interval(tick);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Aggregation job stopping");
                break;
            }
            _ = interval.tick() => {
                if let Err(e) = run_tick(&pool, Utc::now()).await {
                    tracing::error!(error = %e, "Aggregation tick failed");
                }
            }
        }
    }
}

/// One scheduled tick: aggregate the current and previous daily windows,
/// guarded by the advisory lease. Skips silently when another instance
/// holds the lease.
pub async fn run_tick(pool: &PgPool, now: Timestamp) -> Result<(), sqlx::Error> {
    // The lease must be taken and released on the same connection; pin one
    // for the duration of the tick while the rollups use the pool.
    let mut lease_conn = pool.acquire().await?;
    let acquired: bool =
        sqlx::query_scalar("SELECT pg_try_advisory_lock(hashtextextended($1, 0))")
            .bind(LEASE_NAME)
            .fetch_one(&mut *lease_conn)
            .await?;
    if !acquired {
        tracing::debug!("Another instance holds the aggregation lease, skipping tick");
        return Ok(());
    }

    let kind = PeriodKind::Daily;
    let result = async {
        for period_start in [kind.previous_start(now), kind.period_start(now)] {
            let stats = run_window(pool, kind, period_start).await?;
            tracing::info!(
                period_kind = %kind,
                period_start = %period_start,
                written = stats.written,
                skipped_empty = stats.skipped_empty,
                failed = stats.failed,
                "Aggregation window done"
            );
        }
        Ok(())
    }
    .await;

    let released = sqlx::query("SELECT pg_advisory_unlock(hashtextextended($1, 0))")
        .bind(LEASE_NAME)
        .execute(&mut *lease_conn)
        .await;
    if let Err(e) = released {
        tracing::error!(error = %e, "Failed to release aggregation lease");
    }

    result
}

/// Aggregate one `(kind, period_start)` window across every aggregatable
/// sensor. Per-sensor failures are logged and do not abort the batch.
pub async fn run_window(
    pool: &PgPool,
    kind: PeriodKind,
    period_start: Timestamp,
) -> Result<WindowStats, sqlx::Error> {
    let period_end = kind.period_end(period_start);
    let sensor_ids = SensorRepo::list_aggregatable_ids(pool).await?;
    let mut stats = WindowStats::default();

    for sensor_id in sensor_ids {
        match aggregate_sensor(pool, sensor_id, kind, period_start, period_end).await {
            Ok(true) => stats.written += 1,
            Ok(false) => stats.skipped_empty += 1,
            Err(e) => {
                stats.failed += 1;
                tracing::error!(
                    sensor_id,
                    period_kind = %kind,
                    period_start = %period_start,
                    error = %e,
                    "Sensor rollup failed, continuing batch"
                );
            }
        }
    }

    Ok(stats)
}

/// Roll up one sensor's window. Returns whether a row was written; an empty
/// window writes nothing and leaves any existing row untouched.
async fn aggregate_sensor(
    pool: &PgPool,
    sensor_id: DbId,
    kind: PeriodKind,
    period_start: Timestamp,
    period_end: Timestamp,
) -> Result<bool, sqlx::Error> {
    let rows = ReadingRepo::window_samples(pool, sensor_id, period_start, period_end).await?;
    let samples: Vec<ReadingSample> = rows
        .iter()
        .map(|r| ReadingSample {
            value: r.value,
            is_anomaly: r.is_anomaly,
        })
        .collect();

    let Some(summary) = summarize(&samples) else {
        return Ok(false);
    };

    let alert_count = AlertRepo::count_created_between(pool, sensor_id, period_start, period_end).await?;
    ReadingAggregateRepo::upsert(
        pool,
        sensor_id,
        kind.as_str(),
        period_start,
        period_end,
        &summary,
        alert_count,
    )
    .await?;

    Ok(true)
}
