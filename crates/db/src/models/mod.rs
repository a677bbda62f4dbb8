//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod alert;
pub mod alert_rule;
pub mod hub;
pub mod reading;
pub mod reading_aggregate;
pub mod sensor;
pub mod sensor_type;
