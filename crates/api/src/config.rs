/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// How often the aggregation job ticks, in seconds (default: `900`).
    pub aggregation_interval_secs: u64,
    /// How often the hub/sensor staleness sweep runs, in seconds
    /// (default: `60`).
    pub health_sweep_interval_secs: u64,
    /// Raw readings older than this many days are purged by the retention
    /// job. `0` disables the purge (default: `0`).
    pub reading_retention_days: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                    |
    /// |-----------------------------|----------------------------|
    /// | `HOST`                      | `0.0.0.0`                  |
    /// | `PORT`                      | `3000`                     |
    /// | `CORS_ORIGINS`              | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`     | `30`                       |
    /// | `AGGREGATION_INTERVAL_SECS` | `900`                      |
    /// | `HEALTH_SWEEP_INTERVAL_SECS`| `60`                       |
    /// | `READING_RETENTION_DAYS`    | `0` (disabled)             |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let aggregation_interval_secs: u64 = std::env::var("AGGREGATION_INTERVAL_SECS")
            .unwrap_or_else(|_| "900".into())
            .parse()
            .expect("AGGREGATION_INTERVAL_SECS must be a valid u64");

        let health_sweep_interval_secs: u64 = std::env::var("HEALTH_SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("HEALTH_SWEEP_INTERVAL_SECS must be a valid u64");

        let reading_retention_days: i64 = std::env::var("READING_RETENTION_DAYS")
            .unwrap_or_else(|_| "0".into())
            .parse()
            .expect("READING_RETENTION_DAYS must be a valid i64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            aggregation_interval_secs,
            health_sweep_interval_secs,
            reading_retention_days,
        }
    }
}
