//! Repository for the `sensor_types` catalog.

use sqlx::PgPool;

use crate::models::sensor_type::SensorType;

/// Column list for `sensor_types` SELECT queries.
const COLUMNS: &str = "\
    id, slug, name, unit, min_value, max_value, \
    default_alert_min, default_alert_max, supports_aggregation, created_at";

/// Provides query operations for the sensor type catalog.
pub struct SensorTypeRepo;

impl SensorTypeRepo {
    /// Get a sensor type by slug.
    pub async fn get_by_slug(pool: &PgPool, slug: &str) -> Result<Option<SensorType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sensor_types WHERE slug = $1");
        sqlx::query_as::<_, SensorType>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List the full catalog.
    pub async fn list(pool: &PgPool) -> Result<Vec<SensorType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sensor_types ORDER BY slug");
        sqlx::query_as::<_, SensorType>(&query).fetch_all(pool).await
    }
}
