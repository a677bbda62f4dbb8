use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: storewatch_db::DbPool,
    /// Server configuration (timeouts, job intervals, CORS).
    pub config: Arc<ServerConfig>,
    /// Broadcast bus carrying freshly created alerts to the notification
    /// dispatcher.
    pub event_bus: Arc<storewatch_events::EventBus>,
}
