//! Restricted zone lookups: breach detection and nearest-zone queries.

use std::collections::BTreeSet;

use serde::Serialize;
use tourist_safety_geo_models::{Coordinate, RestrictedZone, RiskLevel};

use crate::{distance_meters, is_inside};

/// A zone paired with its distance from a query point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyZone {
    /// The zone.
    #[serde(flatten)]
    pub zone: RestrictedZone,
    /// Distance from the query point to the zone center in meters.
    pub distance_meters: f64,
}

/// Result of checking a point against the active zone set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeofenceStatus {
    /// Whether the point is inside at least one active zone.
    pub inside: bool,
    /// Every active zone containing the point.
    pub breached_zones: Vec<RestrictedZone>,
    /// Closest zones not breached, nearest first.
    pub nearby_zones: Vec<NearbyZone>,
    /// Highest risk among the breached zones.
    pub risk_level: Option<RiskLevel>,
}

/// Returns every active zone that contains `point`, in input order.
#[must_use]
pub fn breaches<'a>(point: &Coordinate, zones: &'a [RestrictedZone]) -> Vec<&'a RestrictedZone> {
    zones
        .iter()
        .filter(|zone| zone.is_active && is_inside(point, &zone.center, zone.radius_meters))
        .collect()
}

/// Picks the zone with the highest [`RiskLevel`]. Among equal risk levels
/// the first one encountered wins.
#[must_use]
pub fn highest_risk<'a>(zones: &[&'a RestrictedZone]) -> Option<&'a RestrictedZone> {
    zones.iter().copied().fold(None, |best, zone| match best {
        Some(current) if zone.risk_level <= current.risk_level => Some(current),
        _ => Some(zone),
    })
}

/// Returns up to `limit` zones within `max_distance_meters` of `point`,
/// skipping ids in `exclude`, sorted by ascending distance.
///
/// Every supplied zone is considered; callers pass the active set.
#[must_use]
pub fn nearest(
    point: &Coordinate,
    zones: &[RestrictedZone],
    max_distance_meters: f64,
    exclude: &BTreeSet<&str>,
    limit: usize,
) -> Vec<NearbyZone> {
    let mut nearby: Vec<NearbyZone> = zones
        .iter()
        .filter(|zone| !exclude.contains(zone.id.as_str()))
        .map(|zone| NearbyZone {
            distance_meters: distance_meters(point, &zone.center),
            zone: zone.clone(),
        })
        .filter(|n| n.distance_meters <= max_distance_meters)
        .collect();

    nearby.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));
    nearby.truncate(limit);
    nearby
}

/// Builds the full geofence report for `point`: breached zones, the
/// nearest non-breached zones within `nearby_radius_meters`, and the
/// highest breached risk level.
#[must_use]
pub fn geofence_status(
    point: &Coordinate,
    zones: &[RestrictedZone],
    nearby_radius_meters: f64,
    nearby_limit: usize,
) -> GeofenceStatus {
    let breached = breaches(point, zones);
    let exclude: BTreeSet<&str> = breached.iter().map(|z| z.id.as_str()).collect();
    let nearby_zones = nearest(point, zones, nearby_radius_meters, &exclude, nearby_limit);
    let risk_level = breached.iter().map(|z| z.risk_level).max();

    if !breached.is_empty() {
        log::debug!(
            "Point ({}, {}) breaches {} zone(s), max risk {risk_level:?}",
            point.latitude,
            point.longitude,
            breached.len()
        );
    }

    GeofenceStatus {
        inside: !breached.is_empty(),
        breached_zones: breached.into_iter().cloned().collect(),
        nearby_zones,
        risk_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(id: &str, lat: f64, lng: f64, radius: f64, risk: RiskLevel) -> RestrictedZone {
        RestrictedZone {
            id: id.to_string(),
            name: format!("Zone {id}"),
            center: Coordinate::new(lat, lng),
            radius_meters: radius,
            risk_level: risk,
            zone_type: "test".to_string(),
            is_active: true,
        }
    }

    fn fixture() -> Vec<RestrictedZone> {
        vec![
            zone("a", 28.6139, 77.2090, 1_000.0, RiskLevel::Medium),
            zone("b", 28.6150, 77.2100, 2_000.0, RiskLevel::High),
            zone("c", 28.6200, 77.2090, 500.0, RiskLevel::High),
            zone("d", 28.7041, 77.1025, 800.0, RiskLevel::Critical),
            zone("e", 30.0, 78.0, 1_000.0, RiskLevel::Low),
        ]
    }

    #[test]
    fn breaches_respects_radius_and_active_flag() {
        let mut zones = fixture();
        let point = Coordinate::new(28.6139, 77.2090);
        let ids: Vec<&str> = breaches(&point, &zones).iter().map(|z| z.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        zones[1].is_active = false;
        let ids: Vec<&str> = breaches(&point, &zones).iter().map(|z| z.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn highest_risk_prefers_first_on_tie() {
        let zones = fixture();
        let refs: Vec<&RestrictedZone> = vec![&zones[0], &zones[1], &zones[2]];
        assert_eq!(highest_risk(&refs).unwrap().id, "b");

        let refs: Vec<&RestrictedZone> = vec![&zones[2], &zones[1]];
        assert_eq!(highest_risk(&refs).unwrap().id, "c");

        assert!(highest_risk(&[]).is_none());
    }

    #[test]
    fn nearest_filters_sorts_and_limits() {
        let zones = fixture();
        let point = Coordinate::new(28.6139, 77.2090);
        let exclude = BTreeSet::from(["a"]);

        let result = nearest(&point, &zones, 20_000.0, &exclude, 10);
        let ids: Vec<&str> = result.iter().map(|n| n.zone.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "d"]);
        assert!(result.windows(2).all(|w| w[0].distance_meters <= w[1].distance_meters));
        assert!(result.iter().all(|n| n.distance_meters <= 20_000.0));

        let limited = nearest(&point, &zones, 20_000.0, &exclude, 2);
        assert_eq!(limited.len(), 2);

        let close = nearest(&point, &zones, 1_000.0, &BTreeSet::new(), 10);
        let ids: Vec<&str> = close.iter().map(|n| n.zone.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn geofence_status_reports_breach_and_neighbors() {
        let zones = fixture();
        let status = geofence_status(&Coordinate::new(28.6139, 77.2090), &zones, 10_000.0, 5);

        assert!(status.inside);
        assert_eq!(status.risk_level, Some(RiskLevel::High));
        assert_eq!(status.breached_zones.len(), 2);
        let nearby: Vec<&str> = status
            .nearby_zones
            .iter()
            .map(|n| n.zone.id.as_str())
            .collect();
        assert_eq!(nearby, vec!["c"]);
    }

    #[test]
    fn geofence_status_outside_everything() {
        let zones = fixture();
        let status = geofence_status(&Coordinate::new(10.0, 10.0), &zones, 10_000.0, 5);
        assert!(!status.inside);
        assert!(status.breached_zones.is_empty());
        assert!(status.nearby_zones.is_empty());
        assert_eq!(status.risk_level, None);
    }
}
