#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geospatial primitives for geofencing.
//!
//! Distances use the haversine formula on a sphere of radius
//! [`EARTH_RADIUS_METERS`]. That is accurate enough for zone radii from a
//! few hundred meters up to tens of kilometers; no ellipsoidal correction
//! is applied. Inputs are assumed to be validated degrees.
//!
//! The [`zones`] module builds the restricted-zone queries on top of these
//! primitives. Zones are scanned linearly.

pub mod zones;

use tourist_safety_geo_models::Coordinate;

/// Mean Earth radius used by [`distance_meters`].
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates in meters.
///
/// Altitude is ignored.
#[must_use]
pub fn distance_meters(a: &Coordinate, b: &Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Returns `true` if `point` lies within `radius_meters` of `center`.
///
/// The boundary is inclusive.
#[must_use]
pub fn is_inside(point: &Coordinate, center: &Coordinate, radius_meters: f64) -> bool {
    distance_meters(point, center) <= radius_meters
}
