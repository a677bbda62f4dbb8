//! Rollup math and period-window bucketing for reading aggregates.
//!
//! Pure logic, no database access. [`summarize`] folds one period's samples
//! into a complete replacement row, so re-running a period overwrites rather
//! than accumulates.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Duration, Months, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// PeriodKind
// ---------------------------------------------------------------------------

/// Rollup window size. Daily is the scheduled default; the other kinds are
/// accepted by the engine and the query surface alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl PeriodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKind::Hourly => "hourly",
            PeriodKind::Daily => "daily",
            PeriodKind::Weekly => "weekly",
            PeriodKind::Monthly => "monthly",
        }
    }

    /// Start of the period containing `at`.
    ///
    /// Weeks start on Monday; all bucketing is UTC.
    pub fn period_start(&self, at: Timestamp) -> Timestamp {
        let date = at.date_naive();
        let anchor = match self {
            PeriodKind::Hourly | PeriodKind::Daily => date,
            PeriodKind::Weekly => date - Days::new(u64::from(date.weekday().num_days_from_monday())),
            PeriodKind::Monthly => date - Days::new(u64::from(date.day0())),
        };
        let midnight = anchor.and_time(NaiveTime::MIN).and_utc();
        match self {
            PeriodKind::Hourly => midnight + Duration::hours(i64::from(at.hour())),
            _ => midnight,
        }
    }

    /// Exclusive end of the period starting at `start`.
    pub fn period_end(&self, start: Timestamp) -> Timestamp {
        match self {
            PeriodKind::Hourly => start + Duration::hours(1),
            PeriodKind::Daily => start + Duration::days(1),
            PeriodKind::Weekly => start + Duration::days(7),
            PeriodKind::Monthly => start + Months::new(1),
        }
    }

    /// Start of the period immediately before the one containing `now`.
    pub fn previous_start(&self, now: Timestamp) -> Timestamp {
        let current = self.period_start(now);
        match self {
            PeriodKind::Hourly => current - Duration::hours(1),
            PeriodKind::Daily => current - Duration::days(1),
            PeriodKind::Weekly => current - Duration::days(7),
            PeriodKind::Monthly => current - Months::new(1),
        }
    }
}

impl FromStr for PeriodKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hourly" => Ok(PeriodKind::Hourly),
            "daily" => Ok(PeriodKind::Daily),
            "weekly" => Ok(PeriodKind::Weekly),
            "monthly" => Ok(PeriodKind::Monthly),
            other => Err(CoreError::Validation(format!(
                "Invalid period kind '{other}'. Must be one of: hourly, daily, weekly, monthly"
            ))),
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Summarization
// ---------------------------------------------------------------------------

/// One reading's contribution to a rollup.
#[derive(Debug, Clone, Copy)]
pub struct ReadingSample {
    pub value: f64,
    pub is_anomaly: bool,
}

/// Complete rollup values for one sensor and period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateSummary {
    pub min_value: f64,
    pub max_value: f64,
    pub avg_value: f64,
    pub reading_count: i64,
    pub anomaly_count: i64,
}

/// Fold one period's samples into a replacement summary.
///
/// Returns `None` for an empty window: no row is written and an existing row
/// for that window is left untouched.
pub fn summarize(samples: &[ReadingSample]) -> Option<AggregateSummary> {
    if samples.is_empty() {
        return None;
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut anomaly_count = 0_i64;

    for sample in samples {
        min = min.min(sample.value);
        max = max.max(sample.value);
        sum += sample.value;
        if sample.is_anomaly {
            anomaly_count += 1;
        }
    }

    Some(AggregateSummary {
        min_value: min,
        max_value: max,
        avg_value: sum / samples.len() as f64,
        reading_count: samples.len() as i64,
        anomaly_count,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
