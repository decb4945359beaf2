//! Route deviation: distance from the active itinerary destination.

use tourist_safety_anomaly_models::{
    AnomalyDetail, AnomalyKind, AnomalyVerdict, NotComputableReason, Severity,
};
use tourist_safety_geo::distance_meters;
use tourist_safety_geo_models::{Coordinate, ItineraryStop, StopStatus};

use crate::round2;

/// Beyond this many kilometers the severity becomes high.
const HIGH_SEVERITY_KM: f64 = 10.0;

/// Measures the distance from `current` to the destination of the
/// in-progress stop (or the first stop if none is in progress) and flags
/// an anomaly beyond `threshold_km`.
#[must_use]
pub fn detect_route_deviation(
    current: &Coordinate,
    itinerary: &[ItineraryStop],
    threshold_km: f64,
) -> AnomalyVerdict {
    let Some(stop) = itinerary
        .iter()
        .find(|s| s.status == StopStatus::InProgress)
        .or_else(|| itinerary.first())
    else {
        return AnomalyVerdict::not_computable(
            AnomalyKind::RouteDeviation,
            NotComputableReason::NoItinerary,
        );
    };

    let distance_km = distance_meters(current, &stop.destination) / 1000.0;

    AnomalyVerdict {
        kind: AnomalyKind::RouteDeviation,
        is_anomaly: distance_km > threshold_km,
        severity: Some(if distance_km > HIGH_SEVERITY_KM {
            Severity::High
        } else {
            Severity::Medium
        }),
        detail: AnomalyDetail::RouteDeviation {
            deviation_km: round2(distance_km),
            threshold_km,
            destination: stop.destination_name.clone(),
        },
    }
}
