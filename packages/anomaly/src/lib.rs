#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Anomaly detectors.
//!
//! Each detector is a pure function over already-fetched data that returns
//! exactly one [`AnomalyVerdict`]. A verdict with `is_anomaly == false` is
//! never forwarded to storage or scoring. Missing data produces a
//! not-computable verdict rather than an error.
//!
//! Location history slices are expected most-recent-first.

pub mod altitude;
pub mod geofence;
pub mod inactivity;
pub mod route;
pub mod speed;

use chrono::{DateTime, Utc};
use tourist_safety_anomaly_models::{
    AnomalyKind, AnomalyVerdict, DetectorConfig, NotComputableReason,
};
use tourist_safety_geo_models::{ItineraryStop, LocationSample, RestrictedZone};

pub use altitude::detect_altitude_drop;
pub use geofence::detect_geofence_breach;
pub use inactivity::detect_inactivity;
pub use route::detect_route_deviation;
pub use speed::detect_speed_anomaly;

/// Everything the full detector set needs for one tourist.
#[derive(Debug, Clone, Copy)]
pub struct DetectionInput<'a> {
    /// Recent samples, most recent first.
    pub history: &'a [LocationSample],
    /// The tourist's itinerary.
    pub itinerary: &'a [ItineraryStop],
    /// Active restricted zones.
    pub zones: &'a [RestrictedZone],
}

/// Runs all five detectors and returns their verdicts in a fixed order:
/// inactivity, route deviation, altitude drop, speed, geofence breach.
///
/// Detectors that need a current position report
/// [`NotComputableReason::NoLocationHistory`] when `history` is empty.
#[must_use]
pub fn detect_all(
    input: &DetectionInput<'_>,
    config: &DetectorConfig,
    now: DateTime<Utc>,
) -> Vec<AnomalyVerdict> {
    let latest = input.history.first();

    let verdicts = vec![
        latest.map_or_else(
            || no_history(AnomalyKind::Inactivity),
            |s| detect_inactivity(s.timestamp, now, config.inactivity_minutes),
        ),
        latest.map_or_else(
            || no_history(AnomalyKind::RouteDeviation),
            |s| detect_route_deviation(&s.coordinate, input.itinerary, config.deviation_km),
        ),
        detect_altitude_drop(
            input.history,
            config.altitude_drop_meters,
            config.altitude_window_minutes,
        ),
        detect_speed_anomaly(input.history, config.speed_kmh),
        latest.map_or_else(
            || no_history(AnomalyKind::GeofenceBreach),
            |s| detect_geofence_breach(&s.coordinate, input.zones),
        ),
    ];

    for verdict in verdicts.iter().filter(|v| v.is_anomaly) {
        log::debug!(
            "{} anomaly ({:?}): {:?}",
            verdict.kind,
            verdict.severity,
            verdict.detail
        );
    }

    verdicts
}

const fn no_history(kind: AnomalyKind) -> AnomalyVerdict {
    AnomalyVerdict::not_computable(kind, NotComputableReason::NoLocationHistory)
}

/// Rounds to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rounds to the nearest whole number.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn round_whole(value: f64) -> i64 {
    value.round() as i64
}

/// Minutes elapsed from `earlier` to `later` (negative if reversed).
#[allow(clippy::cast_precision_loss)]
pub(crate) fn minutes_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 60_000.0
}
