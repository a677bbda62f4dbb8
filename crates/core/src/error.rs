use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Ingestion referenced a sensor that is not registered. The reading is
    /// rejected and nothing is persisted.
    #[error("Unknown sensor: {0}")]
    UnknownSensor(String),

    /// An alert status transition that the state machine does not permit.
    #[error("Invalid alert transition: {from} -> {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
