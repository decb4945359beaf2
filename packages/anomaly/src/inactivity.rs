//! Inactivity detection: no location update for too long.

use chrono::{DateTime, Utc};
use tourist_safety_anomaly_models::{AnomalyDetail, AnomalyKind, AnomalyVerdict, Severity};

use crate::{minutes_between, round_whole};

/// Above this many minutes of silence the severity becomes high.
const HIGH_SEVERITY_MINUTES: f64 = 60.0;

/// Flags an anomaly when more than `threshold_minutes` have elapsed
/// between `last_update` and `now`.
#[must_use]
pub fn detect_inactivity(
    last_update: DateTime<Utc>,
    now: DateTime<Utc>,
    threshold_minutes: f64,
) -> AnomalyVerdict {
    let elapsed = minutes_between(last_update, now);

    AnomalyVerdict {
        kind: AnomalyKind::Inactivity,
        is_anomaly: elapsed > threshold_minutes,
        severity: Some(if elapsed > HIGH_SEVERITY_MINUTES {
            Severity::High
        } else {
            Severity::Medium
        }),
        detail: AnomalyDetail::Inactivity {
            last_update_minutes: round_whole(elapsed),
            threshold_minutes,
        },
    }
}
