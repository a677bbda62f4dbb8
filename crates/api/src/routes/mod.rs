pub mod alert;
pub mod alert_rule;
pub mod health;
pub mod hub;
pub mod ingest;
pub mod sensor;
pub mod sensor_type;
pub mod site;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ingest/reading                  ingest one reading (POST)
/// /ingest/readings                 ingest a batch, max 1000 (POST)
///
/// /hubs                            list, register (GET, POST)
/// /hubs/{id}                       get (GET)
/// /hubs/{id}/heartbeat             heartbeat (POST)
///
/// /sensors                         list, register (GET, POST)
/// /sensors/{id}                    get, partial update (GET, PATCH)
/// /sensors/{id}/readings           reading history (GET)
/// /sensors/{id}/aggregates         rollup history (GET)
///
/// /sensor-types                    seeded catalog (GET)
///
/// /alerts                          list, paginated + filters (GET)
/// /alerts/{id}                     get (GET)
/// /alerts/{id}/acknowledge         acknowledge (POST)
/// /alerts/{id}/resolve             resolve (POST)
///
/// /alert-rules                     list, create (GET, POST)
/// /alert-rules/{id}                get, update, delete (GET, PATCH, DELETE)
///
/// /sites/{id}/overview             fleet + open alert counts (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Telemetry ingestion (single + batch).
        .nest("/ingest", ingest::router())
        // Hub registry and heartbeats.
        .nest("/hubs", hub::router())
        // Sensor registry and per-sensor history.
        .nest("/sensors", sensor::router())
        // Sensor type catalog.
        .nest("/sensor-types", sensor_type::router())
        // Alert queries and lifecycle transitions.
        .nest("/alerts", alert::router())
        // Threshold rule CRUD.
        .nest("/alert-rules", alert_rule::router())
        // Per-site dashboard counts.
        .nest("/sites", site::router())
}
