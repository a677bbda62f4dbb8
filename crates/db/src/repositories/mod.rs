//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod alert_repo;
pub mod alert_rule_repo;
pub mod hub_repo;
pub mod reading_aggregate_repo;
pub mod reading_repo;
pub mod sensor_repo;
pub mod sensor_type_repo;

pub use alert_repo::AlertRepo;
pub use alert_rule_repo::AlertRuleRepo;
pub use hub_repo::HubRepo;
pub use reading_aggregate_repo::ReadingAggregateRepo;
pub use reading_repo::ReadingRepo;
pub use sensor_repo::SensorRepo;
pub use sensor_type_repo::SensorTypeRepo;
