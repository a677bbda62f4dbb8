//! Domain logic for the storewatch monitoring engine.
//!
//! Everything in this crate is pure: anomaly classification, threshold rule
//! matching, the alert state machine, rollup math, and staleness rules. No
//! database or network access; callers fetch state and pass it in.

pub mod aggregation;
pub mod alert;
pub mod error;
pub mod health;
pub mod paging;
pub mod reading;
pub mod rules;
pub mod types;

pub use error::CoreError;
