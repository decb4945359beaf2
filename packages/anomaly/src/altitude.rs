//! Altitude drop: a sudden loss of altitude between the two latest samples.

use tourist_safety_anomaly_models::{
    AnomalyDetail, AnomalyKind, AnomalyVerdict, NotComputableReason, Severity,
};
use tourist_safety_geo_models::LocationSample;

use crate::{minutes_between, round2, round_whole};

/// Drops larger than this many meters are critical.
const CRITICAL_DROP_METERS: f64 = 200.0;

/// Compares the two most recent samples (`history[0]` is the latest) and
/// flags a loss of more than `drop_threshold_m` meters that happened
/// within `window_minutes`.
///
/// The window is measured as the absolute time between the two samples.
#[must_use]
pub fn detect_altitude_drop(
    history: &[LocationSample],
    drop_threshold_m: f64,
    window_minutes: f64,
) -> AnomalyVerdict {
    let [latest, previous, ..] = history else {
        return AnomalyVerdict::not_computable(
            AnomalyKind::AltitudeDrop,
            NotComputableReason::InsufficientSamples,
        );
    };
    let (Some(latest_alt), Some(previous_alt)) =
        (latest.coordinate.altitude, previous.coordinate.altitude)
    else {
        return AnomalyVerdict::not_computable(
            AnomalyKind::AltitudeDrop,
            NotComputableReason::MissingAltitude,
        );
    };

    let drop = previous_alt - latest_alt;
    let minutes = minutes_between(previous.timestamp, latest.timestamp).abs();

    AnomalyVerdict {
        kind: AnomalyKind::AltitudeDrop,
        is_anomaly: drop > drop_threshold_m && minutes <= window_minutes,
        severity: Some(if drop > CRITICAL_DROP_METERS {
            Severity::Critical
        } else {
            Severity::High
        }),
        detail: AnomalyDetail::AltitudeDrop {
            altitude_drop_m: round_whole(drop),
            time_minutes: round2(minutes),
            threshold_m: drop_threshold_m,
        },
    }
}
