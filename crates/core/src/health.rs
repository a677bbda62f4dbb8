//! Staleness rules for hub heartbeats and sensor reporting.
//!
//! Pure logic: the sweep job fetches the online population and passes each
//! entity's last-contact time in.

use chrono::Duration;

use crate::types::Timestamp;

/// A hub is considered offline once this many expected heartbeats have been
/// missed in a row.
pub const HUB_GRACE_MULTIPLE: i64 = 3;

/// A sensor is considered offline once this many reporting intervals have
/// passed without a reading. At the default 300 s interval this yields the
/// 30-minute cutoff.
pub const SENSOR_GRACE_MULTIPLE: i64 = 6;

/// Whether an entity that should report every `interval_secs` has been
/// silent past its grace window.
///
/// An entity that has never reported (`last_contact = None`) is not stale:
/// it has not yet come online, so there is nothing to demote.
pub fn is_stale(
    last_contact: Option<Timestamp>,
    now: Timestamp,
    interval_secs: i64,
    grace_multiple: i64,
) -> bool {
    match last_contact {
        None => false,
        Some(at) => now - at > Duration::seconds(interval_secs * grace_multiple),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn minutes_ago(now: Timestamp, minutes: i64) -> Option<Timestamp> {
        Some(now - Duration::minutes(minutes))
    }

    #[test]
    fn fresh_contact_is_not_stale() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        assert!(!is_stale(minutes_ago(now, 1), now, 60, HUB_GRACE_MULTIPLE));
    }

    #[test]
    fn contact_at_exact_grace_boundary_is_not_stale() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        // 60 s interval x 3 grace = 180 s.
        assert!(!is_stale(minutes_ago(now, 3), now, 60, HUB_GRACE_MULTIPLE));
    }

    #[test]
    fn contact_past_grace_window_is_stale() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        assert!(is_stale(minutes_ago(now, 4), now, 60, HUB_GRACE_MULTIPLE));
    }

    #[test]
    fn default_sensor_cutoff_is_thirty_minutes() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        assert!(!is_stale(minutes_ago(now, 30), now, 300, SENSOR_GRACE_MULTIPLE));
        assert!(is_stale(minutes_ago(now, 31), now, 300, SENSOR_GRACE_MULTIPLE));
    }

    #[test]
    fn never_seen_is_not_stale() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        assert!(!is_stale(None, now, 60, HUB_GRACE_MULTIPLE));
    }
}
