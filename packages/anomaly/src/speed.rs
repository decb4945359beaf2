//! Speed anomaly: implausibly fast movement between the two latest samples.

use tourist_safety_anomaly_models::{
    AnomalyDetail, AnomalyKind, AnomalyVerdict, NotComputableReason, Severity,
};
use tourist_safety_geo::distance_meters;
use tourist_safety_geo_models::LocationSample;

use crate::{minutes_between, round2};

/// Speeds above this many km/h are critical.
const CRITICAL_SPEED_KMH: f64 = 200.0;

/// Computes horizontal speed between `history[0]` (latest) and
/// `history[1]` and flags anything above `threshold_kmh`.
///
/// Two samples with the same timestamp produce a not-computable verdict
/// instead of a division by zero.
#[must_use]
pub fn detect_speed_anomaly(history: &[LocationSample], threshold_kmh: f64) -> AnomalyVerdict {
    let [latest, previous, ..] = history else {
        return AnomalyVerdict::not_computable(
            AnomalyKind::SpeedAnomaly,
            NotComputableReason::InsufficientSamples,
        );
    };

    let hours = minutes_between(previous.timestamp, latest.timestamp).abs() / 60.0;
    if hours <= 0.0 {
        return AnomalyVerdict::not_computable(
            AnomalyKind::SpeedAnomaly,
            NotComputableReason::ZeroElapsedTime,
        );
    }

    let km = distance_meters(&latest.coordinate, &previous.coordinate) / 1000.0;
    let speed_kmh = km / hours;

    AnomalyVerdict {
        kind: AnomalyKind::SpeedAnomaly,
        is_anomaly: speed_kmh > threshold_kmh,
        severity: Some(if speed_kmh > CRITICAL_SPEED_KMH {
            Severity::Critical
        } else {
            Severity::Medium
        }),
        detail: AnomalyDetail::SpeedAnomaly {
            speed_kmh: round2(speed_kmh),
            threshold_kmh,
        },
    }
}
