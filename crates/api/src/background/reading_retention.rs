//! Periodic purge of old raw readings.
//!
//! Deletes readings older than the configured retention period. Aggregates
//! are never purged, so history survives in rolled-up form. Disabled by
//! default (`READING_RETENTION_DAYS=0`).

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use storewatch_db::repositories::ReadingRepo;
use tokio_util::sync::CancellationToken;

/// How often the purge job runs.
const PURGE_INTERVAL: Duration = Duration::from_secs(86_400); // daily

/// Run the reading retention loop until `cancel` is triggered.
///
/// A non-positive `retention_days` disables the job entirely.
pub async fn run(pool: PgPool, retention_days: i64, cancel: CancellationToken) {
    if retention_days <= 0 {
        tracing::info!("Reading retention disabled (READING_RETENTION_DAYS=0)");
        return;
    }

    tracing::info!(
        retention_days,
        interval_secs = PURGE_INTERVAL.as_secs(),
        "Reading retention job started"
    );

    let mut interval = tokio::time::interval(PURGE_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Reading retention job stopping");
                break;
            }
            _ = interval.tick() => {
                let cutoff = Utc::now() - chrono::Duration::days(retention_days);
                match ReadingRepo::delete_older_than(&pool, cutoff).await {
                    Ok(deleted) => {
                        if deleted > 0 {
                            tracing::info!(deleted, "Reading retention: purged old readings");
                        } else {
                            tracing::debug!("Reading retention: nothing to purge");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Reading retention: purge failed");
                    }
                }
            }
        }
    }
}
