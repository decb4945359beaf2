#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Tourist clustering for the dashboard.
//!
//! Reduces a location log to one latest position per tourist, then groups
//! those positions greedily: each unclaimed position seeds a cluster and
//! claims every later unclaimed position within the radius of the seed.
//! Membership is decided against the seed only, so the result depends on
//! input order. That is acceptable for a dashboard overview.

use std::collections::BTreeMap;

use geo::{Centroid as _, MultiPoint, Point};
use serde::Serialize;
use tourist_safety_geo::distance_meters;
use tourist_safety_geo_models::{Coordinate, LocationSample};

/// A group of tourists near each other.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    /// Mean position of the members, or the seed position for a single
    /// member.
    pub center: Coordinate,
    /// Latest sample of each member, seed first.
    pub members: Vec<LocationSample>,
    /// Number of members.
    pub count: usize,
}

/// Dashboard clustering result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterReport {
    /// Clusters in seed order.
    pub clusters: Vec<Cluster>,
    /// Number of distinct tourists considered.
    pub total_tourists: usize,
    /// Number of clusters.
    pub cluster_count: usize,
    /// Radius used for membership.
    pub clustering_radius_meters: f64,
}

/// Keeps only the most recent sample per DTID. On equal timestamps the
/// first sample seen wins. Output is ordered by DTID.
#[must_use]
pub fn latest_per_tourist<'a, I>(samples: I) -> Vec<LocationSample>
where
    I: IntoIterator<Item = &'a LocationSample>,
{
    let mut latest: BTreeMap<&str, &LocationSample> = BTreeMap::new();

    for sample in samples {
        latest
            .entry(sample.dtid.as_str())
            .and_modify(|current| {
                if sample.timestamp > current.timestamp {
                    *current = sample;
                }
            })
            .or_insert(sample);
    }

    latest.into_values().cloned().collect()
}

/// Greedily clusters `positions`. Every position lands in exactly one
/// cluster.
#[must_use]
pub fn cluster_positions(positions: &[LocationSample], radius_meters: f64) -> Vec<Cluster> {
    let mut claimed = vec![false; positions.len()];
    let mut clusters = Vec::new();

    for (i, seed) in positions.iter().enumerate() {
        if claimed[i] {
            continue;
        }
        claimed[i] = true;

        let mut members = vec![seed.clone()];
        for (j, other) in positions.iter().enumerate().skip(i + 1) {
            if !claimed[j] && distance_meters(&seed.coordinate, &other.coordinate) <= radius_meters
            {
                claimed[j] = true;
                members.push(other.clone());
            }
        }

        let center = if members.len() > 1 {
            mean_position(&members).unwrap_or(seed.coordinate)
        } else {
            seed.coordinate
        };

        clusters.push(Cluster {
            center,
            count: members.len(),
            members,
        });
    }

    clusters
}

/// Collapses `samples` to latest positions and clusters them.
#[must_use]
pub fn build_report(samples: &[LocationSample], radius_meters: f64) -> ClusterReport {
    let positions = latest_per_tourist(samples);
    let clusters = cluster_positions(&positions, radius_meters);

    log::debug!(
        "Clustered {} tourists into {} groups (radius {radius_meters} m)",
        positions.len(),
        clusters.len()
    );

    ClusterReport {
        total_tourists: positions.len(),
        cluster_count: clusters.len(),
        clusters,
        clustering_radius_meters: radius_meters,
    }
}

fn mean_position(members: &[LocationSample]) -> Option<Coordinate> {
    let points: MultiPoint<f64> = members
        .iter()
        .map(|m| Point::from(m.coordinate))
        .collect::<Vec<_>>()
        .into();
    points.centroid().map(Coordinate::from)
}
