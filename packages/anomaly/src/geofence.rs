//! Geofence breach: the current position is inside an active restricted zone.

use tourist_safety_anomaly_models::{AnomalyDetail, AnomalyKind, AnomalyVerdict, Severity};
use tourist_safety_geo::distance_meters;
use tourist_safety_geo::zones::{breaches, highest_risk};
use tourist_safety_geo_models::{Coordinate, RestrictedZone};

use crate::round_whole;

/// Flags a breach when `point` is inside any active zone. The verdict
/// describes the highest-risk breached zone and takes its risk level as
/// the severity.
#[must_use]
pub fn detect_geofence_breach(point: &Coordinate, zones: &[RestrictedZone]) -> AnomalyVerdict {
    let breached = breaches(point, zones);

    let Some(zone) = highest_risk(&breached) else {
        return AnomalyVerdict {
            kind: AnomalyKind::GeofenceBreach,
            is_anomaly: false,
            severity: None,
            detail: AnomalyDetail::GeofenceClear {
                zones_checked: zones.len(),
            },
        };
    };

    log::debug!(
        "Geofence breach: ({}, {}) inside {} ({}, risk {})",
        point.latitude,
        point.longitude,
        zone.name,
        zone.zone_type,
        zone.risk_level
    );

    AnomalyVerdict {
        kind: AnomalyKind::GeofenceBreach,
        is_anomaly: true,
        severity: Some(Severity::from(zone.risk_level)),
        detail: AnomalyDetail::GeofenceBreach {
            zone_id: zone.id.clone(),
            zone_name: zone.name.clone(),
            zone_type: zone.zone_type.clone(),
            risk_level: zone.risk_level,
            distance_meters: round_whole(distance_meters(point, &zone.center)),
            zone_radius: zone.radius_meters,
        },
    }
}
