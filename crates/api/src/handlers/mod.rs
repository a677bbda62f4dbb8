//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers delegate to the corresponding repository in `storewatch_db`
//! (ingestion goes through the engine) and map errors via [`AppError`].
//!
//! [`AppError`]: crate::error::AppError

pub mod alert;
pub mod alert_rule;
pub mod hub;
pub mod ingest;
pub mod sensor;
pub mod sensor_type;
pub mod site;
