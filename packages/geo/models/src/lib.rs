#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geographic input types for the tourist safety engine.
//!
//! These are the read-only shapes the engine consumes from the storage
//! layer: raw positions, restricted zones, and itinerary stops. The
//! [`RiskLevel`] scale defined here is shared by zone ranking, anomaly
//! severity ranking, and score banding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A WGS84 position in degrees with an optional altitude in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Altitude above sea level in meters, if the device reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
}

impl Coordinate {
    /// Creates a coordinate without altitude.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
        }
    }

    /// Returns a copy of this coordinate carrying the given altitude.
    #[must_use]
    pub const fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    /// Checks that latitude and longitude are finite and within range.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCoordinateError`] if latitude is outside
    /// `[-90, 90]`, longitude is outside `[-180, 180]`, or either value
    /// (or the altitude) is not finite.
    pub fn validate(&self) -> Result<(), InvalidCoordinateError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(InvalidCoordinateError::Latitude {
                value: self.latitude,
            });
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(InvalidCoordinateError::Longitude {
                value: self.longitude,
            });
        }
        if let Some(altitude) = self.altitude
            && !altitude.is_finite()
        {
            return Err(InvalidCoordinateError::Altitude { value: altitude });
        }
        Ok(())
    }
}

impl From<Coordinate> for geo::Point<f64> {
    fn from(c: Coordinate) -> Self {
        Self::new(c.longitude, c.latitude)
    }
}

impl From<geo::Point<f64>> for Coordinate {
    fn from(p: geo::Point<f64>) -> Self {
        Self::new(p.y(), p.x())
    }
}

/// Error returned when a [`Coordinate`] fails range validation.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum InvalidCoordinateError {
    /// Latitude outside `[-90, 90]` or not finite.
    #[error("invalid latitude {value}: expected -90..=90")]
    Latitude {
        /// The rejected value.
        value: f64,
    },
    /// Longitude outside `[-180, 180]` or not finite.
    #[error("invalid longitude {value}: expected -180..=180")]
    Longitude {
        /// The rejected value.
        value: f64,
    },
    /// Altitude present but not finite.
    #[error("invalid altitude {value}: expected a finite number")]
    Altitude {
        /// The rejected value.
        value: f64,
    },
}

/// One reported position of a tourist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    /// Tourist identifier (DTID).
    pub dtid: String,
    /// Reported position.
    #[serde(flatten)]
    pub coordinate: Coordinate,
    /// Reported horizontal accuracy in meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    /// When the device captured the position.
    pub timestamp: DateTime<Utc>,
}

/// Risk level of a restricted zone, from 1 (low) to 4 (critical).
///
/// The same scale ranks anomaly severity and bands safety scores.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RiskLevel {
    /// Level 1
    Low = 1,
    /// Level 2
    Medium = 2,
    /// Level 3
    High = 3,
    /// Level 4
    Critical = 4,
}

impl RiskLevel {
    /// Returns the ordinal of this risk level (1-4).
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Creates a risk level from its ordinal.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in the range 1-4.
    pub const fn from_value(value: u8) -> Result<Self, InvalidRiskLevelError> {
        match value {
            1 => Ok(Self::Low),
            2 => Ok(Self::Medium),
            3 => Ok(Self::High),
            4 => Ok(Self::Critical),
            _ => Err(InvalidRiskLevelError { value }),
        }
    }

    /// Bands a safety score: below 30 is critical, below 50 high, below
    /// 70 medium, anything else low.
    #[must_use]
    pub const fn for_score(score: u8) -> Self {
        match score {
            0..30 => Self::Critical,
            30..50 => Self::High,
            50..70 => Self::Medium,
            _ => Self::Low,
        }
    }

    /// Returns the score interval `[min, max)` that [`Self::for_score`]
    /// maps to this band. The low band is closed at 100.
    #[must_use]
    pub const fn score_range(self) -> (u8, u8) {
        match self {
            Self::Critical => (0, 30),
            Self::High => (30, 50),
            Self::Medium => (50, 70),
            Self::Low => (70, 101),
        }
    }

    /// Returns all variants in ascending order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High, Self::Critical]
    }
}

/// Error returned when attempting to create a [`RiskLevel`] from an invalid
/// ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid risk level {value}: expected 1-4")]
pub struct InvalidRiskLevelError {
    /// The invalid value that was provided.
    pub value: u8,
}

/// A circular restricted area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestrictedZone {
    /// Zone identifier.
    pub id: String,
    /// Human-readable zone name.
    pub name: String,
    /// Center of the zone.
    pub center: Coordinate,
    /// Radius in meters.
    pub radius_meters: f64,
    /// How dangerous entering the zone is.
    pub risk_level: RiskLevel,
    /// Free-form zone category (e.g. `"military"`, `"wildlife"`).
    pub zone_type: String,
    /// Inactive zones are ignored by breach detection.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

/// Progress of an itinerary stop.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StopStatus {
    /// Not yet started.
    Planned,
    /// The tourist is currently heading to this stop.
    InProgress,
    /// Already visited.
    Completed,
}

/// A planned destination on a tourist's itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryStop {
    /// Tourist identifier (DTID).
    pub dtid: String,
    /// Destination position.
    pub destination: Coordinate,
    /// Destination display name.
    pub destination_name: String,
    /// Current status of the stop.
    pub status: StopStatus,
}
