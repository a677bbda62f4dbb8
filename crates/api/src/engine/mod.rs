//! Reading ingestion engine.
//!
//! Contains the ingest path that validates raw telemetry, classifies
//! anomalies and persists the reading, plus the rule evaluator that turns
//! threshold violations into alerts (cooldown-deduped) and publishes them
//! for the notification dispatcher.

pub mod evaluate;
pub mod ingest;
