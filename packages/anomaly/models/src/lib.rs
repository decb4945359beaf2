#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Anomaly verdict types and detector thresholds.
//!
//! A detector produces an [`AnomalyVerdict`]. Verdicts are transient; the
//! storage layer turns anomalous ones into [`PersistedAnomaly`] rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use tourist_safety_geo_models::{Coordinate, RiskLevel};
use uuid::Uuid;

/// The five anomaly kinds the engine can detect.
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
pub enum AnomalyKind {
    /// No location update for too long.
    Inactivity,
    /// Too far from the active itinerary destination.
    RouteDeviation,
    /// Sudden loss of altitude between two samples.
    AltitudeDrop,
    /// Implausibly fast movement between two samples.
    SpeedAnomaly,
    /// Inside a restricted zone.
    GeofenceBreach,
}

impl AnomalyKind {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Inactivity,
            Self::RouteDeviation,
            Self::AltitudeDrop,
            Self::SpeedAnomaly,
            Self::GeofenceBreach,
        ]
    }
}

/// Severity of an anomaly. There is no low severity; a breach of a
/// low-risk zone is reported as [`Severity::Medium`].
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
pub enum Severity {
    /// Ordinal 2 on the risk scale.
    Medium,
    /// Ordinal 3 on the risk scale.
    High,
    /// Ordinal 4 on the risk scale.
    Critical,
}

impl Severity {
    /// Position of this severity on the shared [`RiskLevel`] scale.
    #[must_use]
    pub const fn risk_level(self) -> RiskLevel {
        match self {
            Self::Medium => RiskLevel::Medium,
            Self::High => RiskLevel::High,
            Self::Critical => RiskLevel::Critical,
        }
    }

    /// Ordinal on the shared risk scale (2-4).
    #[must_use]
    pub const fn value(self) -> u8 {
        self.risk_level().value()
    }
}

impl From<RiskLevel> for Severity {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Low | RiskLevel::Medium => Self::Medium,
            RiskLevel::High => Self::High,
            RiskLevel::Critical => Self::Critical,
        }
    }
}

/// Why a detector could not reach a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotComputableReason {
    /// Fewer than two location samples.
    InsufficientSamples,
    /// One of the two latest samples has no altitude.
    MissingAltitude,
    /// The two latest samples share a timestamp.
    ZeroElapsedTime,
    /// The tourist has no itinerary stops.
    NoItinerary,
    /// The tourist has never reported a position.
    NoLocationHistory,
}

/// Kind-specific evidence attached to a verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "evidence", rename_all = "snake_case")]
pub enum AnomalyDetail {
    /// Evidence for [`AnomalyKind::Inactivity`].
    Inactivity {
        /// Minutes since the last update, rounded.
        last_update_minutes: i64,
        /// Configured threshold in minutes.
        threshold_minutes: f64,
    },
    /// Evidence for [`AnomalyKind::RouteDeviation`].
    RouteDeviation {
        /// Distance to the active destination in km, two decimals.
        deviation_km: f64,
        /// Configured threshold in km.
        threshold_km: f64,
        /// Name of the destination measured against.
        destination: String,
    },
    /// Evidence for [`AnomalyKind::AltitudeDrop`].
    AltitudeDrop {
        /// Altitude lost between the two samples in meters, rounded.
        altitude_drop_m: i64,
        /// Minutes between the two samples, two decimals.
        time_minutes: f64,
        /// Configured drop threshold in meters.
        threshold_m: f64,
    },
    /// Evidence for [`AnomalyKind::SpeedAnomaly`].
    SpeedAnomaly {
        /// Horizontal speed in km/h, two decimals.
        speed_kmh: f64,
        /// Configured threshold in km/h.
        threshold_kmh: f64,
    },
    /// Evidence for [`AnomalyKind::GeofenceBreach`].
    GeofenceBreach {
        /// Breached zone id.
        zone_id: String,
        /// Breached zone name.
        zone_name: String,
        /// Breached zone type.
        zone_type: String,
        /// Breached zone risk level.
        risk_level: RiskLevel,
        /// Distance to the zone center in meters, rounded.
        distance_meters: i64,
        /// Zone radius in meters.
        zone_radius: f64,
    },
    /// No active zone contains the point.
    GeofenceClear {
        /// Number of zones checked.
        zones_checked: usize,
    },
    /// The detector had too little data to decide.
    NotComputable {
        /// What was missing.
        reason: NotComputableReason,
    },
}

/// Output of a single detector run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyVerdict {
    /// Which detector produced this verdict.
    pub kind: AnomalyKind,
    /// Whether the anomalous condition holds. Only anomalous verdicts are
    /// forwarded to storage and scoring.
    pub is_anomaly: bool,
    /// Severity the condition would carry. `None` when not computable.
    pub severity: Option<Severity>,
    /// Supporting evidence.
    pub detail: AnomalyDetail,
}

impl AnomalyVerdict {
    /// A non-anomalous verdict recording why no decision was possible.
    #[must_use]
    pub const fn not_computable(kind: AnomalyKind, reason: NotComputableReason) -> Self {
        Self {
            kind,
            is_anomaly: false,
            severity: None,
            detail: AnomalyDetail::NotComputable { reason },
        }
    }

    /// Returns the reason if this verdict is not computable.
    #[must_use]
    pub fn not_computable_reason(&self) -> Option<NotComputableReason> {
        match self.detail {
            AnomalyDetail::NotComputable { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Lifecycle of a stored anomaly.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
pub enum AnomalyStatus {
    /// Still affecting the safety score.
    #[default]
    Active,
    /// Handled; no longer scored.
    Resolved,
}

/// An anomaly about to be written to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAnomaly {
    /// Tourist identifier (DTID).
    pub dtid: String,
    /// Anomaly kind.
    pub kind: AnomalyKind,
    /// Severity.
    pub severity: Severity,
    /// Human-readable summary.
    pub description: String,
    /// Where the tourist was when it was detected.
    pub location: Option<Coordinate>,
    /// Evidence copied from the verdict.
    pub detail: AnomalyDetail,
}

impl NewAnomaly {
    /// Builds a storage row from an anomalous verdict.
    ///
    /// Returns `None` if the verdict is not anomalous.
    #[must_use]
    pub fn from_verdict(
        dtid: &str,
        verdict: &AnomalyVerdict,
        location: Option<Coordinate>,
    ) -> Option<Self> {
        if !verdict.is_anomaly {
            return None;
        }
        let severity = verdict.severity?;
        Some(Self {
            dtid: dtid.to_string(),
            kind: verdict.kind,
            severity,
            description: describe(verdict),
            location,
            detail: verdict.detail.clone(),
        })
    }
}

fn describe(verdict: &AnomalyVerdict) -> String {
    match &verdict.detail {
        AnomalyDetail::Inactivity {
            last_update_minutes,
            ..
        } => format!("No location update for {last_update_minutes} minutes"),
        AnomalyDetail::RouteDeviation {
            deviation_km,
            destination,
            ..
        } => format!("{deviation_km} km away from {destination}"),
        AnomalyDetail::AltitudeDrop {
            altitude_drop_m,
            time_minutes,
            ..
        } => format!("Dropped {altitude_drop_m} m in {time_minutes} minutes"),
        AnomalyDetail::SpeedAnomaly { speed_kmh, .. } => {
            format!("Moving at {speed_kmh} km/h")
        }
        AnomalyDetail::GeofenceBreach { zone_name, .. } => {
            format!("Entered restricted zone: {zone_name}")
        }
        AnomalyDetail::GeofenceClear { zones_checked } => {
            format!("Outside all {zones_checked} restricted zones")
        }
        AnomalyDetail::NotComputable { reason } => {
            format!("{} not computable: {reason}", verdict.kind)
        }
    }
}

/// A stored anomaly as returned by the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedAnomaly {
    /// Generated identifier.
    pub id: Uuid,
    /// Tourist identifier (DTID).
    pub dtid: String,
    /// Anomaly kind.
    pub kind: AnomalyKind,
    /// Severity.
    pub severity: Severity,
    /// Human-readable summary.
    pub description: String,
    /// Where the tourist was when it was detected.
    #[serde(default)]
    pub location: Option<Coordinate>,
    /// Evidence copied from the verdict.
    pub detail: AnomalyDetail,
    /// When storage recorded the anomaly.
    pub detected_at: DateTime<Utc>,
    /// Lifecycle status.
    #[serde(default)]
    pub status: AnomalyStatus,
}

/// Thresholds for the anomaly detectors. Every field may be overridden
/// independently; missing fields take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Minutes without an update before inactivity is flagged.
    pub inactivity_minutes: f64,
    /// Kilometers from the active destination before deviation is flagged.
    pub deviation_km: f64,
    /// Meters of altitude loss that count as a drop.
    pub altitude_drop_meters: f64,
    /// Maximum minutes between samples for a drop to count.
    pub altitude_window_minutes: f64,
    /// Speed in km/h above which movement is flagged.
    pub speed_kmh: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            inactivity_minutes: 30.0,
            deviation_km: 5.0,
            altitude_drop_meters: 100.0,
            altitude_window_minutes: 2.0,
            speed_kmh: 120.0,
        }
    }
}
