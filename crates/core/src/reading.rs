//! Anomaly classification for incoming readings.
//!
//! Pure logic, no database access. The caller fetches the sensor and its
//! catalog defaults and passes the bounds in.

use crate::error::CoreError;

/// Effective alerting bounds for one sensor.
///
/// Per-sensor overrides win over the catalog defaults, resolved one side at
/// a time; a side with neither override nor default is unbounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl EffectiveRange {
    /// Resolve the bounds for a sensor from its overrides and the sensor
    /// type's defaults.
    pub fn resolve(
        sensor_min: Option<f64>,
        sensor_max: Option<f64>,
        default_min: Option<f64>,
        default_max: Option<f64>,
    ) -> Self {
        Self {
            min: sensor_min.or(default_min),
            max: sensor_max.or(default_max),
        }
    }

    /// Whether `value` falls outside the range on a bounded side.
    ///
    /// Anomalous readings are stored and flagged, never rejected; sensor
    /// noise must stay auditable.
    pub fn is_anomaly(&self, value: f64) -> bool {
        self.min.is_some_and(|min| value < min) || self.max.is_some_and(|max| value > max)
    }
}

/// Validate a raw reading value before persistence.
///
/// Non-finite values (NaN, ±inf) cannot be compared against thresholds or
/// rolled into aggregates, so they are rejected outright.
pub fn validate_value(value: f64) -> Result<(), CoreError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Reading value must be finite (got {value})"
        )))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
