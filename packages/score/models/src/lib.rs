#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Safety score record types.
//!
//! A [`SafetyScoreRecord`] is a plain value: the ledger functions take one
//! in and hand a new one back. Persisting it, and serializing concurrent
//! updates for the same tourist, is the storage layer's job.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use tourist_safety_anomaly_models::AnomalyKind;
use tourist_safety_geo_models::RiskLevel;

/// Highest possible score, also the score of a fresh record.
pub const MAX_SCORE: u8 = 100;

/// Lowest possible score.
pub const MIN_SCORE: u8 = 0;

/// Last deduction applied per anomaly kind. A later deduction for the same
/// kind replaces the earlier one.
pub type ScoreFactors = BTreeMap<AnomalyKind, i32>;

/// A tourist's current safety score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyScoreRecord {
    /// Tourist identifier (DTID).
    pub dtid: String,
    /// Current score, always within `0..=100`.
    pub current_score: u8,
    /// Last deduction applied per anomaly kind.
    #[serde(default)]
    pub factors: ScoreFactors,
    /// When the score last changed.
    pub last_updated: DateTime<Utc>,
}

impl SafetyScoreRecord {
    /// A fresh record at [`MAX_SCORE`] with no factors.
    #[must_use]
    pub fn new(dtid: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            dtid: dtid.into(),
            current_score: MAX_SCORE,
            factors: ScoreFactors::new(),
            last_updated: now,
        }
    }

    /// Band of the current score.
    #[must_use]
    pub const fn risk_level(&self) -> RiskLevel {
        RiskLevel::for_score(self.current_score)
    }
}

/// How repeated active anomalies of one kind are deducted on recompute.
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
pub enum DeductionPolicy {
    /// Every active anomaly deducts, so three inactivity anomalies deduct
    /// three times.
    #[default]
    PerInstance,
    /// Each kind deducts at most once, using its largest deduction.
    CappedPerKind,
}

/// A score record annotated with its band, as listed on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedScore {
    /// The stored record.
    #[serde(flatten)]
    pub record: SafetyScoreRecord,
    /// Band of the record's score.
    pub risk_level: RiskLevel,
}
