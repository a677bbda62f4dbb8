//! HTTP-level integration tests for rule evaluation, the alert lifecycle and
//! alert rule management.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, patch_json, post_json};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Register a hub plus one sensor of the given catalog type via the API.
/// Returns the sensor id.
async fn setup_sensor(pool: &PgPool, serial: &str, type_slug: &str) -> i64 {
    let app = common::build_test_app(pool.clone());
    let hub = body_json(
        post_json(
            app,
            "/api/v1/hubs",
            serde_json::json!({
                "tenant_id": 1,
                "site_id": 7,
                "name": format!("Hub for {serial}"),
                "serial_number": format!("HUB-{serial}"),
            }),
        )
        .await,
    )
    .await;
    let hub_id = hub["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let types = body_json(get(app, "/api/v1/sensor-types").await).await;
    let type_id = types["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["slug"] == type_slug)
        .unwrap_or_else(|| panic!("catalog is missing slug '{type_slug}'"))["id"]
        .as_i64()
        .unwrap();

    let app = common::build_test_app(pool.clone());
    let sensor = body_json(
        post_json(
            app,
            "/api/v1/sensors",
            serde_json::json!({
                "hub_id": hub_id,
                "sensor_type_id": type_id,
                "name": format!("Sensor {serial}"),
                "serial_number": serial,
            }),
        )
        .await,
    )
    .await;
    sensor["data"]["id"].as_i64().unwrap()
}

/// Create an alert rule via the API, asserting success. Returns the rule id.
async fn create_rule(pool: &PgPool, body: serde_json::Value) -> i64 {
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/alert-rules", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Push one reading and return the response body.
async fn ingest(pool: &PgPool, sensor_id: i64, value: f64) -> serde_json::Value {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/ingest/reading",
        serde_json::json!({"sensor_id": sensor_id, "value": value}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

/// Total alerts currently visible through the list endpoint.
async fn alert_total(pool: &PgPool) -> i64 {
    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, "/api/v1/alerts").await).await;
    json["total"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Rule evaluation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn threshold_breach_raises_alert(pool: PgPool) {
    let sensor_id = setup_sensor(&pool, "SEN-AL-001", "temperature").await;
    create_rule(
        &pool,
        serde_json::json!({
            "tenant_id": 1,
            "name": "Too warm",
            "condition": "above",
            "threshold_value": 35.0,
            "severity": "critical",
            "cooldown_minutes": 30,
        }),
    )
    .await;

    let outcome = ingest(&pool, sensor_id, 38.0).await;
    let alerts = outcome["data"]["alerts"].as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["alert_type"], "threshold_exceeded");
    assert_eq!(alerts[0]["severity"], "critical");
    assert_eq!(alerts[0]["status"], "active");
    assert_eq!(alerts[0]["trigger_value"], 38.0);
    assert_eq!(alerts[0]["threshold_value"], 35.0);
    assert!(alerts[0]["message"]
        .as_str()
        .unwrap()
        .contains("exceeded threshold"));
    // The stored reading carries the marker.
    assert_eq!(outcome["data"]["reading"]["triggered_alert"], true);

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/alerts?status=active").await).await;
    assert_eq!(json["total"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn value_equal_to_threshold_does_not_fire(pool: PgPool) {
    let sensor_id = setup_sensor(&pool, "SEN-AL-002", "temperature").await;
    create_rule(
        &pool,
        serde_json::json!({
            "tenant_id": 1,
            "name": "Too warm",
            "condition": "above",
            "threshold_value": 35.0,
        }),
    )
    .await;

    let outcome = ingest(&pool, sensor_id, 35.0).await;
    assert!(outcome["data"]["alerts"].as_array().unwrap().is_empty());
    assert_eq!(alert_total(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cooldown_suppresses_repeat_alerts(pool: PgPool) {
    let sensor_id = setup_sensor(&pool, "SEN-AL-003", "temperature").await;
    create_rule(
        &pool,
        serde_json::json!({
            "tenant_id": 1,
            "name": "Too warm",
            "condition": "above",
            "threshold_value": 35.0,
            "cooldown_minutes": 30,
        }),
    )
    .await;

    let first = ingest(&pool, sensor_id, 38.0).await;
    assert_eq!(first["data"]["alerts"].as_array().unwrap().len(), 1);

    // Still breaching, still within the 30 minute window: suppressed.
    let second = ingest(&pool, sensor_id, 39.0).await;
    assert!(second["data"]["alerts"].as_array().unwrap().is_empty());
    assert_eq!(second["data"]["reading"]["triggered_alert"], false);
    assert_eq!(alert_total(&pool).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cooldown_expiry_allows_refire(pool: PgPool) {
    let sensor_id = setup_sensor(&pool, "SEN-AL-004", "temperature").await;
    create_rule(
        &pool,
        serde_json::json!({
            "tenant_id": 1,
            "name": "Too warm",
            "condition": "above",
            "threshold_value": 35.0,
            "cooldown_minutes": 30,
        }),
    )
    .await;
    ingest(&pool, sensor_id, 38.0).await;

    // Age the first alert past the cooldown window.
    sqlx::query("UPDATE alerts SET created_at = now() - interval '31 minutes'")
        .execute(&pool)
        .await
        .unwrap();

    let outcome = ingest(&pool, sensor_id, 39.0).await;
    assert_eq!(outcome["data"]["alerts"].as_array().unwrap().len(), 1);
    assert_eq!(alert_total(&pool).await, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn resolving_clears_the_cooldown_guard(pool: PgPool) {
    let sensor_id = setup_sensor(&pool, "SEN-AL-005", "temperature").await;
    create_rule(
        &pool,
        serde_json::json!({
            "tenant_id": 1,
            "name": "Too warm",
            "condition": "above",
            "threshold_value": 35.0,
            "cooldown_minutes": 30,
        }),
    )
    .await;

    let first = ingest(&pool, sensor_id, 38.0).await;
    let alert_id = first["data"]["alerts"][0]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    post_json(
        app,
        &format!("/api/v1/alerts/{alert_id}/resolve"),
        serde_json::json!({"actor_id": 9}),
    )
    .await;

    // Dedup only considers unresolved alerts, so the next breach fires
    // immediately even inside the cooldown window.
    let second = ingest(&pool, sensor_id, 39.0).await;
    assert_eq!(second["data"]["alerts"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn global_rule_fires_for_every_sensor_type(pool: PgPool) {
    let temp_id = setup_sensor(&pool, "SEN-AL-006", "temperature").await;
    let door_id = setup_sensor(&pool, "SEN-AL-007", "door").await;
    create_rule(
        &pool,
        serde_json::json!({
            "tenant_id": 1,
            "name": "Fleet low-value",
            "sensor_type_id": null,
            "condition": "below",
            "threshold_value": 1.0,
        }),
    )
    .await;

    let temp_outcome = ingest(&pool, temp_id, 0.5).await;
    let door_outcome = ingest(&pool, door_id, 0.0).await;
    assert_eq!(temp_outcome["data"]["alerts"].as_array().unwrap().len(), 1);
    assert_eq!(door_outcome["data"]["alerts"].as_array().unwrap().len(), 1);

    // One alert per sensor; the cooldown guard is per (sensor, rule) pair.
    assert_eq!(alert_total(&pool).await, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn disabled_sensor_skips_evaluation(pool: PgPool) {
    let sensor_id = setup_sensor(&pool, "SEN-AL-008", "temperature").await;
    create_rule(
        &pool,
        serde_json::json!({
            "tenant_id": 1,
            "name": "Too warm",
            "condition": "above",
            "threshold_value": 35.0,
        }),
    )
    .await;

    let app = common::build_test_app(pool.clone());
    patch_json(
        app,
        &format!("/api/v1/sensors/{sensor_id}"),
        serde_json::json!({"alerts_enabled": false}),
    )
    .await;

    let outcome = ingest(&pool, sensor_id, 40.0).await;
    // The reading is still stored and flagged; only alerting is muted.
    assert_eq!(outcome["data"]["reading"]["is_anomaly"], true);
    assert!(outcome["data"]["alerts"].as_array().unwrap().is_empty());
    assert_eq!(alert_total(&pool).await, 0);
}

// ---------------------------------------------------------------------------
// Alert lifecycle
// ---------------------------------------------------------------------------

/// Raise one alert through the rule path and return its id.
async fn raise_alert(pool: &PgPool, serial: &str) -> i64 {
    let sensor_id = setup_sensor(pool, serial, "temperature").await;
    create_rule(
        pool,
        serde_json::json!({
            "tenant_id": 1,
            "name": format!("Rule for {serial}"),
            "condition": "above",
            "threshold_value": 35.0,
        }),
    )
    .await;
    let outcome = ingest(pool, sensor_id, 40.0).await;
    outcome["data"]["alerts"][0]["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn acknowledge_stamps_actor_and_time(pool: PgPool) {
    let alert_id = raise_alert(&pool, "SEN-AL-010").await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        &format!("/api/v1/alerts/{alert_id}/acknowledge"),
        serde_json::json!({"actor_id": 42}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let alert = &body_json(response).await["data"];
    assert_eq!(alert["status"], "acknowledged");
    assert_eq!(alert["acknowledged_by"], 42);
    assert!(!alert["acknowledged_at"].is_null());
    assert!(alert["resolved_at"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn resolve_records_actor_and_notes(pool: PgPool) {
    let alert_id = raise_alert(&pool, "SEN-AL-011").await;

    let app = common::build_test_app(pool.clone());
    post_json(
        app,
        &format!("/api/v1/alerts/{alert_id}/acknowledge"),
        serde_json::json!({"actor_id": 42}),
    )
    .await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        &format!("/api/v1/alerts/{alert_id}/resolve"),
        serde_json::json!({"actor_id": 43, "notes": "Compressor fixed"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let alert = &body_json(response).await["data"];
    assert_eq!(alert["status"], "resolved");
    assert_eq!(alert["resolved_by"], 43);
    assert_eq!(alert["resolution_notes"], "Compressor fixed");
    // The acknowledgement trail survives resolution.
    assert_eq!(alert["acknowledged_by"], 42);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn resolve_straight_from_active_is_allowed(pool: PgPool) {
    let alert_id = raise_alert(&pool, "SEN-AL-012").await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        &format!("/api/v1/alerts/{alert_id}/resolve"),
        serde_json::json!({"actor_id": 42}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "resolved");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn resolved_alert_rejects_further_transitions(pool: PgPool) {
    let alert_id = raise_alert(&pool, "SEN-AL-013").await;

    let app = common::build_test_app(pool.clone());
    post_json(
        app,
        &format!("/api/v1/alerts/{alert_id}/resolve"),
        serde_json::json!({"actor_id": 42}),
    )
    .await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        &format!("/api/v1/alerts/{alert_id}/acknowledge"),
        serde_json::json!({"actor_id": 42}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_TRANSITION");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn acknowledging_unknown_alert_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/alerts/999999/acknowledge",
        serde_json::json!({"actor_id": 42}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Alert listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn alert_list_filters_and_pages(pool: PgPool) {
    let sensor_id = setup_sensor(&pool, "SEN-AL-020", "temperature").await;
    create_rule(
        &pool,
        serde_json::json!({
            "tenant_id": 1,
            "name": "Warm",
            "condition": "above",
            "threshold_value": 35.0,
            "severity": "warning",
            "cooldown_minutes": 0,
        }),
    )
    .await;
    create_rule(
        &pool,
        serde_json::json!({
            "tenant_id": 1,
            "name": "Scorching",
            "condition": "above",
            "threshold_value": 45.0,
            "severity": "critical",
            "cooldown_minutes": 0,
        }),
    )
    .await;

    // 50 °C breaches both rules in one evaluation pass.
    let outcome = ingest(&pool, sensor_id, 50.0).await;
    assert_eq!(outcome["data"]["alerts"].as_array().unwrap().len(), 2);

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, "/api/v1/alerts?severity=critical").await).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["data"][0]["severity"], "critical");

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, "/api/v1/alerts?limit=1&offset=1").await).await;
    assert_eq!(json["total"], 2);
    assert_eq!(json["limit"], 1);
    assert_eq!(json["offset"], 1);
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/alerts?site_id=404").await).await;
    assert_eq!(json["total"], 0);
}

// ---------------------------------------------------------------------------
// Site overview
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn site_overview_reports_counts(pool: PgPool) {
    setup_sensor(&pool, "SEN-AL-030", "humidity").await;
    let alert_id = raise_alert(&pool, "SEN-AL-031").await;

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, "/api/v1/sites/7/overview").await).await;
    assert_eq!(json["data"]["site_id"], 7);
    assert_eq!(json["data"]["sensors"]["total"], 2);
    assert_eq!(json["data"]["sensors"]["by_status"]["active"], 2);
    assert_eq!(json["data"]["open_alerts"]["total"], 1);
    assert_eq!(json["data"]["open_alerts"]["by_severity"]["warning"], 1);

    let app = common::build_test_app(pool.clone());
    post_json(
        app,
        &format!("/api/v1/alerts/{alert_id}/resolve"),
        serde_json::json!({"actor_id": 42}),
    )
    .await;

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, "/api/v1/sites/7/overview").await).await;
    assert_eq!(json["data"]["open_alerts"]["total"], 0);

    // Unknown sites report zero counts rather than 404.
    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/sites/999/overview").await).await;
    assert_eq!(json["data"]["sensors"]["total"], 0);
}

// ---------------------------------------------------------------------------
// Rule management
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn rule_create_applies_defaults(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/alert-rules",
        serde_json::json!({
            "tenant_id": 1,
            "name": "Defaults",
            "condition": "above",
            "threshold_value": 10.0,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let rule = &body_json(response).await["data"];
    assert_eq!(rule["severity"], "warning");
    assert_eq!(rule["cooldown_minutes"], 60);
    assert_eq!(rule["notification_channels"], serde_json::json!(["email"]));
    assert_eq!(rule["is_active"], true);
    assert!(rule["sensor_type_id"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rule_with_invalid_condition_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/alert-rules",
        serde_json::json!({
            "tenant_id": 1,
            "name": "Bad",
            "condition": "sideways",
            "threshold_value": 10.0,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rule_update_and_list_filter(pool: PgPool) {
    let rule_id = create_rule(
        &pool,
        serde_json::json!({
            "tenant_id": 1,
            "name": "Tenant one",
            "condition": "above",
            "threshold_value": 10.0,
        }),
    )
    .await;
    create_rule(
        &pool,
        serde_json::json!({
            "tenant_id": 2,
            "name": "Tenant two",
            "condition": "below",
            "threshold_value": 5.0,
        }),
    )
    .await;

    let app = common::build_test_app(pool.clone());
    let response = patch_json(
        app,
        &format!("/api/v1/alert-rules/{rule_id}"),
        serde_json::json!({"threshold_value": 12.5, "is_active": false}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let rule = &body_json(response).await["data"];
    assert_eq!(rule["threshold_value"], 12.5);
    assert_eq!(rule["is_active"], false);
    assert_eq!(rule["name"], "Tenant one");

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/alert-rules?tenant_id=2").await).await;
    let rules = json["data"].as_array().unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0]["name"], "Tenant two");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn inactive_rule_never_fires(pool: PgPool) {
    let sensor_id = setup_sensor(&pool, "SEN-AL-040", "temperature").await;
    create_rule(
        &pool,
        serde_json::json!({
            "tenant_id": 1,
            "name": "Muted",
            "condition": "above",
            "threshold_value": 35.0,
            "is_active": false,
        }),
    )
    .await;

    let outcome = ingest(&pool, sensor_id, 40.0).await;
    assert!(outcome["data"]["alerts"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_rule_preserves_its_alerts(pool: PgPool) {
    let sensor_id = setup_sensor(&pool, "SEN-AL-041", "temperature").await;
    let rule_id = create_rule(
        &pool,
        serde_json::json!({
            "tenant_id": 1,
            "name": "Doomed",
            "condition": "above",
            "threshold_value": 35.0,
        }),
    )
    .await;
    let outcome = ingest(&pool, sensor_id, 40.0).await;
    let alert_id = outcome["data"]["alerts"][0]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/alert-rules/{rule_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/alert-rules/{rule_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The alert outlives its rule, unlinked.
    let app = common::build_test_app(pool);
    let alert = body_json(get(app, &format!("/api/v1/alerts/{alert_id}")).await).await;
    assert_eq!(alert["data"]["status"], "active");
    assert!(alert["data"]["rule_id"].is_null());
}
