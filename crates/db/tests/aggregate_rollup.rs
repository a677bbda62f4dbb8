//! Integration tests for reading aggregates: the replacement upsert and the
//! window extraction it is fed from.

use chrono::{Duration, TimeZone, Utc};
use sqlx::PgPool;
use storewatch_core::aggregation::{summarize, AggregateSummary, PeriodKind, ReadingSample};
use storewatch_core::types::Timestamp;
use storewatch_db::models::hub::CreateHub;
use storewatch_db::models::sensor::CreateSensor;
use storewatch_db::repositories::{
    HubRepo, ReadingAggregateRepo, ReadingRepo, SensorRepo, SensorTypeRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_sensor(pool: &PgPool, serial: &str) -> i64 {
    let type_id = SensorTypeRepo::get_by_slug(pool, "temperature")
        .await
        .unwrap()
        .expect("seeded catalog")
        .id;
    let hub = HubRepo::create(
        pool,
        &CreateHub {
            tenant_id: 1,
            site_id: 1,
            name: format!("Hub {serial}"),
            serial_number: format!("HUB-{serial}"),
            connection_type: None,
            heartbeat_interval_secs: None,
        },
    )
    .await
    .unwrap();
    SensorRepo::create(
        pool,
        &CreateSensor {
            hub_id: hub.id,
            sensor_type_id: type_id,
            unit_id: None,
            name: format!("Sensor {serial}"),
            serial_number: serial.to_string(),
            alert_min: None,
            alert_max: None,
            alerts_enabled: None,
            reading_interval_secs: None,
        },
    )
    .await
    .unwrap()
    .unwrap()
    .id
}

fn day_start() -> Timestamp {
    Utc.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap()
}

/// One day of readings at a 15 minute cadence: 96 rows, values cycling
/// 15.0..24.0, every 10th flagged anomalous.
async fn seed_full_day(pool: &PgPool, sensor_id: i64) {
    let start = day_start();
    for i in 0..96 {
        let value = 15.0 + (i % 10) as f64;
        ReadingRepo::insert(
            pool,
            sensor_id,
            value,
            start + Duration::minutes(15 * i),
            i % 10 == 0,
        )
        .await
        .unwrap();
    }
}

async fn rollup_day(pool: &PgPool, sensor_id: i64) -> AggregateSummary {
    let start = day_start();
    let end = PeriodKind::Daily.period_end(start);
    let rows = ReadingRepo::window_samples(pool, sensor_id, start, end)
        .await
        .unwrap();
    let samples: Vec<ReadingSample> = rows
        .iter()
        .map(|r| ReadingSample {
            value: r.value,
            is_anomaly: r.is_anomaly,
        })
        .collect();
    let summary = summarize(&samples).expect("day has readings");
    ReadingAggregateRepo::upsert(pool, sensor_id, "daily", start, end, &summary, 0)
        .await
        .unwrap();
    summary
}

// ---------------------------------------------------------------------------
// Test: a full day of readings rolls up into one row
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_day_rollup(pool: PgPool) {
    let sensor_id = seed_sensor(&pool, "SN-AGG1").await;
    seed_full_day(&pool, sensor_id).await;

    let summary = rollup_day(&pool, sensor_id).await;
    assert_eq!(summary.reading_count, 96);
    assert_eq!(summary.min_value, 15.0);
    assert_eq!(summary.max_value, 24.0);
    assert_eq!(summary.anomaly_count, 10);

    let row = ReadingAggregateRepo::get_window(&pool, sensor_id, "daily", day_start())
        .await
        .unwrap()
        .expect("rollup row exists");
    assert_eq!(row.reading_count, 96);
    assert_eq!(row.min_value, 15.0);
    assert_eq!(row.max_value, 24.0);
    assert_eq!(row.anomaly_count, 10);
    assert_eq!(row.period_end, PeriodKind::Daily.period_end(day_start()));
}

// ---------------------------------------------------------------------------
// Test: re-running a window replaces instead of accumulating
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rollup_rerun_is_idempotent(pool: PgPool) {
    let sensor_id = seed_sensor(&pool, "SN-AGG2").await;
    seed_full_day(&pool, sensor_id).await;

    let first = rollup_day(&pool, sensor_id).await;
    let second = rollup_day(&pool, sensor_id).await;
    assert_eq!(first, second);

    let rows = ReadingAggregateRepo::list_for_sensor(&pool, sensor_id, Some("daily"), None, None)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1, "rerun must not create a second row");
    assert_eq!(rows[0].reading_count, 96);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rollup_replaces_after_late_data(pool: PgPool) {
    let sensor_id = seed_sensor(&pool, "SN-AGG3").await;
    seed_full_day(&pool, sensor_id).await;
    rollup_day(&pool, sensor_id).await;

    // A late buffered reading lands inside the already-rolled-up day.
    ReadingRepo::insert(
        &pool,
        sensor_id,
        99.0,
        day_start() + Duration::hours(12),
        true,
    )
    .await
    .unwrap();

    rollup_day(&pool, sensor_id).await;
    let row = ReadingAggregateRepo::get_window(&pool, sensor_id, "daily", day_start())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.reading_count, 97);
    assert_eq!(row.max_value, 99.0);
    assert_eq!(row.anomaly_count, 11);
    assert!(row.updated_at >= row.created_at);
}

// ---------------------------------------------------------------------------
// Test: alert_count column and window uniqueness
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_alert_count_is_stored(pool: PgPool) {
    let sensor_id = seed_sensor(&pool, "SN-AGG4").await;
    let start = day_start();
    let end = PeriodKind::Daily.period_end(start);
    ReadingRepo::insert(&pool, sensor_id, 20.0, start, false).await.unwrap();

    let summary = summarize(&[ReadingSample {
        value: 20.0,
        is_anomaly: false,
    }])
    .unwrap();
    let row = ReadingAggregateRepo::upsert(&pool, sensor_id, "daily", start, end, &summary, 3)
        .await
        .unwrap();
    assert_eq!(row.alert_count, 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_kinds_keep_separate_windows(pool: PgPool) {
    let sensor_id = seed_sensor(&pool, "SN-AGG5").await;
    let start = day_start();
    let summary = summarize(&[ReadingSample {
        value: 10.0,
        is_anomaly: false,
    }])
    .unwrap();

    ReadingAggregateRepo::upsert(
        &pool,
        sensor_id,
        "daily",
        start,
        PeriodKind::Daily.period_end(start),
        &summary,
        0,
    )
    .await
    .unwrap();
    ReadingAggregateRepo::upsert(
        &pool,
        sensor_id,
        "hourly",
        start,
        PeriodKind::Hourly.period_end(start),
        &summary,
        0,
    )
    .await
    .unwrap();

    let all = ReadingAggregateRepo::list_for_sensor(&pool, sensor_id, None, None, None)
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let daily = ReadingAggregateRepo::list_for_sensor(&pool, sensor_id, Some("daily"), None, None)
        .await
        .unwrap();
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0].period_kind, "daily");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_period_kind_rejected(pool: PgPool) {
    let sensor_id = seed_sensor(&pool, "SN-AGG6").await;
    let start = day_start();
    let summary = summarize(&[ReadingSample {
        value: 10.0,
        is_anomaly: false,
    }])
    .unwrap();

    let result = ReadingAggregateRepo::upsert(
        &pool,
        sensor_id,
        "fortnightly",
        start,
        start + Duration::days(14),
        &summary,
        0,
    )
    .await;
    assert!(result.is_err(), "check constraint rejects unknown kinds");
}
