//! Alert domain types and the status state machine.
//!
//! An alert moves `active -> acknowledged -> resolved`, with a permitted
//! shortcut `active -> resolved`. `resolved` is terminal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Severity attached to an alert, taken from the rule that raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl FromStr for Severity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "critical" => Ok(Severity::Critical),
            other => Err(CoreError::Validation(format!(
                "Invalid severity '{other}'. Must be one of: info, warning, critical"
            ))),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AlertType
// ---------------------------------------------------------------------------

/// What kind of condition raised the alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    /// A reading crossed an `above` rule threshold.
    ThresholdExceeded,
    /// A reading crossed a `below` rule threshold.
    ThresholdBelow,
    /// The health sweep found the sensor silent past its grace window.
    SensorOffline,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::ThresholdExceeded => "threshold_exceeded",
            AlertType::ThresholdBelow => "threshold_below",
            AlertType::SensorOffline => "sensor_offline",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AlertStatus and transitions
// ---------------------------------------------------------------------------

/// Lifecycle state of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Resolved,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Active => "active",
            AlertStatus::Acknowledged => "acknowledged",
            AlertStatus::Resolved => "resolved",
        }
    }
}

impl FromStr for AlertStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AlertStatus::Active),
            "acknowledged" => Ok(AlertStatus::Acknowledged),
            "resolved" => Ok(AlertStatus::Resolved),
            other => Err(CoreError::Validation(format!(
                "Invalid alert status '{other}'. Must be one of: active, acknowledged, resolved"
            ))),
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the statuses `from` may transition to.
///
/// Transition rules:
/// - `active`       -> `acknowledged`, `resolved`
/// - `acknowledged` -> `resolved`
/// - `resolved`     -> (terminal)
pub fn valid_transitions(from: AlertStatus) -> &'static [AlertStatus] {
    match from {
        AlertStatus::Active => &[AlertStatus::Acknowledged, AlertStatus::Resolved],
        AlertStatus::Acknowledged => &[AlertStatus::Resolved],
        AlertStatus::Resolved => &[],
    }
}

/// Validate a status transition; the alert is left untouched on rejection.
pub fn validate_transition(current: AlertStatus, next: AlertStatus) -> Result<(), CoreError> {
    if valid_transitions(current).contains(&next) {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition {
            from: current.as_str(),
            to: next.as_str(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn active_can_be_acknowledged_or_resolved() {
        assert!(validate_transition(AlertStatus::Active, AlertStatus::Acknowledged).is_ok());
        assert!(validate_transition(AlertStatus::Active, AlertStatus::Resolved).is_ok());
    }

    #[test]
    fn acknowledged_can_only_resolve() {
        assert!(validate_transition(AlertStatus::Acknowledged, AlertStatus::Resolved).is_ok());
        assert!(validate_transition(AlertStatus::Acknowledged, AlertStatus::Active).is_err());
    }

    #[test]
    fn resolved_is_terminal() {
        for next in [
            AlertStatus::Active,
            AlertStatus::Acknowledged,
            AlertStatus::Resolved,
        ] {
            let err = validate_transition(AlertStatus::Resolved, next);
            assert_matches!(
                err,
                Err(CoreError::InvalidTransition { from: "resolved", .. }),
                "resolved must reject transition to {next}"
            );
        }
    }

    #[test]
    fn self_transition_is_invalid() {
        assert!(validate_transition(AlertStatus::Active, AlertStatus::Active).is_err());
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            AlertStatus::Active,
            AlertStatus::Acknowledged,
            AlertStatus::Resolved,
        ] {
            assert_eq!(status.as_str().parse::<AlertStatus>().ok(), Some(status));
        }
        assert!("bogus".parse::<AlertStatus>().is_err());
    }

    #[test]
    fn severity_round_trips_through_str() {
        for severity in [Severity::Info, Severity::Warning, Severity::Critical] {
            assert_eq!(severity.as_str().parse::<Severity>().ok(), Some(severity));
        }
        assert!("".parse::<Severity>().is_err());
    }
}
