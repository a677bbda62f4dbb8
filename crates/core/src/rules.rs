//! Threshold rule matching.
//!
//! Pure logic, no database access. The caller fetches the candidate rules
//! for a sensor and passes them in; cooldown bookkeeping lives in the
//! repository layer where it can be serialized against concurrent inserts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::alert::AlertType;
use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// RuleCondition
// ---------------------------------------------------------------------------

/// Comparison a rule applies to a reading value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCondition {
    Above,
    Below,
}

impl RuleCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCondition::Above => "above",
            RuleCondition::Below => "below",
        }
    }

    /// Whether `value` violates `threshold` under this condition.
    ///
    /// Comparisons are strict: a value equal to the threshold never fires.
    pub fn matches(&self, value: f64, threshold: f64) -> bool {
        match self {
            RuleCondition::Above => value > threshold,
            RuleCondition::Below => value < threshold,
        }
    }

    /// The alert type raised when this condition fires.
    pub fn alert_type(&self) -> AlertType {
        match self {
            RuleCondition::Above => AlertType::ThresholdExceeded,
            RuleCondition::Below => AlertType::ThresholdBelow,
        }
    }
}

impl FromStr for RuleCondition {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "above" => Ok(RuleCondition::Above),
            "below" => Ok(RuleCondition::Below),
            other => Err(CoreError::Validation(format!(
                "Invalid rule condition '{other}'. Must be one of: above, below"
            ))),
        }
    }
}

impl fmt::Display for RuleCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Rule applicability
// ---------------------------------------------------------------------------

/// Whether a rule applies to a sensor of the given type.
///
/// `None` means the rule is global and applies to every sensor type (e.g. a
/// fleet-wide low-battery rule); `Some(id)` restricts it to one type.
pub fn rule_applies(rule_sensor_type_id: Option<DbId>, sensor_type_id: DbId) -> bool {
    match rule_sensor_type_id {
        None => true,
        Some(id) => id == sensor_type_id,
    }
}

// ---------------------------------------------------------------------------
// Alert message
// ---------------------------------------------------------------------------

/// One-line human-readable summary for an alert raised by a rule.
pub fn alert_message(
    sensor_name: &str,
    unit: &str,
    condition: RuleCondition,
    value: f64,
    threshold: f64,
) -> String {
    match condition {
        RuleCondition::Above => {
            format!("{sensor_name}: value {value}{unit} exceeded threshold {threshold}{unit}")
        }
        RuleCondition::Below => {
            format!("{sensor_name}: value {value}{unit} fell below threshold {threshold}{unit}")
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- matches ------------------------------------------------------------

    #[test]
    fn above_fires_only_past_threshold() {
        assert!(RuleCondition::Above.matches(38.0, 35.0));
        assert!(!RuleCondition::Above.matches(35.0, 35.0), "strict comparison");
        assert!(!RuleCondition::Above.matches(34.9, 35.0));
    }

    #[test]
    fn below_fires_only_under_threshold() {
        assert!(RuleCondition::Below.matches(15.0, 20.0));
        assert!(!RuleCondition::Below.matches(20.0, 20.0), "strict comparison");
        assert!(!RuleCondition::Below.matches(20.1, 20.0));
    }

    #[test]
    fn condition_maps_to_alert_type() {
        assert_eq!(
            RuleCondition::Above.alert_type(),
            AlertType::ThresholdExceeded
        );
        assert_eq!(RuleCondition::Below.alert_type(), AlertType::ThresholdBelow);
    }

    #[test]
    fn condition_parses_known_values_only() {
        assert_eq!("above".parse::<RuleCondition>().ok(), Some(RuleCondition::Above));
        assert_eq!("below".parse::<RuleCondition>().ok(), Some(RuleCondition::Below));
        assert!("between".parse::<RuleCondition>().is_err());
        assert!("ABOVE".parse::<RuleCondition>().is_err());
    }

    // -- rule_applies -------------------------------------------------------

    #[test]
    fn global_rule_applies_to_every_type() {
        assert!(rule_applies(None, 1));
        assert!(rule_applies(None, 42));
    }

    #[test]
    fn typed_rule_applies_to_matching_type_only() {
        assert!(rule_applies(Some(3), 3));
        assert!(!rule_applies(Some(3), 4));
    }

    // -- alert_message ------------------------------------------------------

    #[test]
    fn message_describes_the_violation() {
        let msg = alert_message("Unit B12 temperature", "°C", RuleCondition::Above, 38.0, 35.0);
        assert_eq!(
            msg,
            "Unit B12 temperature: value 38°C exceeded threshold 35°C"
        );

        let msg = alert_message("Gate battery", "%", RuleCondition::Below, 12.0, 20.0);
        assert_eq!(msg, "Gate battery: value 12% fell below threshold 20%");
    }
}
