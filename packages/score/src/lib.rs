#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Safety score ledger.
//!
//! Pure functions that fold anomalies into a [`SafetyScoreRecord`]. The
//! score is clamped to `0..=100` after every mutation.
//!
//! These functions are read-modify-write over a value the caller fetched.
//! Two concurrent updates for the same DTID built from the same stored
//! record will clobber each other; callers must serialize mutations per
//! DTID (per-key lock or conditional update in storage).

pub mod ranking;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tourist_safety_anomaly_models::{AnomalyKind, Severity};
use tourist_safety_geo_models::RiskLevel;
use tourist_safety_score_models::{
    DeductionPolicy, MAX_SCORE, MIN_SCORE, SafetyScoreRecord, ScoreFactors,
};

pub use ranking::rank_scores;

/// Clamps a raw score into `0..=100`.
#[must_use]
pub fn clamp_score(raw: i32) -> u8 {
    u8::try_from(raw.clamp(i32::from(MIN_SCORE), i32::from(MAX_SCORE))).unwrap_or(MIN_SCORE)
}

/// Score deduction for one active anomaly on recompute.
#[must_use]
pub const fn deduction(kind: AnomalyKind, severity: Severity) -> i32 {
    match (kind, severity) {
        (AnomalyKind::Inactivity, Severity::High) => -15,
        (AnomalyKind::Inactivity, _) => -10,
        (AnomalyKind::GeofenceBreach, Severity::Critical) => -30,
        (AnomalyKind::GeofenceBreach, _) => -20,
        (AnomalyKind::RouteDeviation, _) => -15,
        (AnomalyKind::AltitudeDrop, Severity::Critical) => -40,
        (AnomalyKind::AltitudeDrop, _) => -25,
        (AnomalyKind::SpeedAnomaly, _) => -10,
    }
}

/// Delta applied inline when a location update lands in a zone.
#[must_use]
pub const fn geofence_delta(zone_risk: RiskLevel) -> i32 {
    match zone_risk {
        RiskLevel::Critical => -30,
        RiskLevel::Low | RiskLevel::Medium | RiskLevel::High => -20,
    }
}

/// Adds `delta` to the record's score and remembers it as the factor for
/// `reason`, replacing any earlier factor for that reason.
#[must_use]
pub fn apply_delta(
    mut record: SafetyScoreRecord,
    reason: AnomalyKind,
    delta: i32,
    now: DateTime<Utc>,
) -> SafetyScoreRecord {
    let previous = record.current_score;
    record.current_score = clamp_score(i32::from(previous).saturating_add(delta));
    record.factors.insert(reason, delta);
    record.last_updated = now;

    log::info!(
        "Score for {}: {previous} -> {} ({reason} {delta:+})",
        record.dtid,
        record.current_score
    );

    record
}

/// Recomputes a score from `baseline` (the stored score, or 100 when the
/// tourist has no record yet) by deducting for each active anomaly.
///
/// Under [`DeductionPolicy::PerInstance`] every anomaly deducts and the
/// factor table keeps the last deduction seen per kind. Under
/// [`DeductionPolicy::CappedPerKind`] each kind deducts once, using its
/// largest deduction.
#[must_use]
pub fn recompute<I>(
    dtid: &str,
    baseline: Option<u8>,
    active: I,
    policy: DeductionPolicy,
    now: DateTime<Utc>,
) -> SafetyScoreRecord
where
    I: IntoIterator<Item = (AnomalyKind, Severity)>,
{
    let start = baseline.unwrap_or(MAX_SCORE);
    let mut factors = ScoreFactors::new();
    let mut total = 0i32;

    match policy {
        DeductionPolicy::PerInstance => {
            for (kind, severity) in active {
                let d = deduction(kind, severity);
                total = total.saturating_add(d);
                factors.insert(kind, d);
            }
        }
        DeductionPolicy::CappedPerKind => {
            let mut worst: BTreeMap<AnomalyKind, i32> = BTreeMap::new();
            for (kind, severity) in active {
                let d = deduction(kind, severity);
                worst
                    .entry(kind)
                    .and_modify(|w| *w = (*w).min(d))
                    .or_insert(d);
            }
            total = worst.values().fold(0i32, |acc, d| acc.saturating_add(*d));
            factors = worst;
        }
    }

    let record = SafetyScoreRecord {
        dtid: dtid.to_string(),
        current_score: clamp_score(i32::from(start).saturating_add(total)),
        factors,
        last_updated: now,
    };

    log::info!(
        "Recomputed score for {dtid}: {start} -> {} ({total:+}, {policy})",
        record.current_score
    );

    record
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 4, 12, 0, 0).unwrap()
    }

    #[test]
    fn clamp_stays_in_range() {
        for s in [0, 1, 50, 99, 100] {
            for d in [-1_000, -101, -100, -30, -1, 0, 1, 30, 100, 1_000] {
                let c = clamp_score(s + d);
                assert!(c <= 100, "{s} + {d} -> {c}");
            }
            assert_eq!(clamp_score(s - 1_000), 0);
            assert_eq!(clamp_score(s + 1_000), 100);
        }
    }

    #[test]
    fn apply_delta_clamps_and_records_factor() {
        let record = SafetyScoreRecord::new("DT-1", now());
        let record = apply_delta(record, AnomalyKind::GeofenceBreach, -30, now());
        assert_eq!(record.current_score, 70);
        assert_eq!(record.factors[&AnomalyKind::GeofenceBreach], -30);

        let floor = apply_delta(record.clone(), AnomalyKind::AltitudeDrop, -1_000, now());
        assert_eq!(floor.current_score, 0);

        let ceiling = apply_delta(record, AnomalyKind::Inactivity, 1_000, now());
        assert_eq!(ceiling.current_score, 100);
    }

    #[test]
    fn apply_delta_saturates_extreme_deltas() {
        let record = SafetyScoreRecord::new("DT-1", now());
        let up = apply_delta(record.clone(), AnomalyKind::Inactivity, i32::MAX, now());
        assert_eq!(up.current_score, 100);
        assert_eq!(up.factors[&AnomalyKind::Inactivity], i32::MAX);

        let down = apply_delta(record, AnomalyKind::Inactivity, i32::MIN, now());
        assert_eq!(down.current_score, 0);

        let low = SafetyScoreRecord {
            current_score: 0,
            ..SafetyScoreRecord::new("DT-1", now())
        };
        let raised = apply_delta(low, AnomalyKind::SpeedAnomaly, i32::MAX, now());
        assert_eq!(raised.current_score, 100);
    }

    #[test]
    fn apply_delta_overwrites_factor() {
        let record = SafetyScoreRecord::new("DT-1", now());
        let record = apply_delta(record, AnomalyKind::GeofenceBreach, -30, now());
        let record = apply_delta(record, AnomalyKind::GeofenceBreach, -20, now());
        assert_eq!(record.current_score, 50);
        assert_eq!(record.factors.len(), 1);
        assert_eq!(record.factors[&AnomalyKind::GeofenceBreach], -20);
    }

    #[test]
    fn geofence_delta_by_zone_risk() {
        assert_eq!(geofence_delta(RiskLevel::Critical), -30);
        assert_eq!(geofence_delta(RiskLevel::High), -20);
        assert_eq!(geofence_delta(RiskLevel::Low), -20);
    }

    #[test]
    fn deduction_table() {
        assert_eq!(deduction(AnomalyKind::Inactivity, Severity::High), -15);
        assert_eq!(deduction(AnomalyKind::Inactivity, Severity::Medium), -10);
        assert_eq!(deduction(AnomalyKind::GeofenceBreach, Severity::Critical), -30);
        assert_eq!(deduction(AnomalyKind::GeofenceBreach, Severity::High), -20);
        assert_eq!(deduction(AnomalyKind::RouteDeviation, Severity::High), -15);
        assert_eq!(deduction(AnomalyKind::AltitudeDrop, Severity::Critical), -40);
        assert_eq!(deduction(AnomalyKind::AltitudeDrop, Severity::High), -25);
        assert_eq!(deduction(AnomalyKind::SpeedAnomaly, Severity::Critical), -10);
    }

    #[test]
    fn recompute_without_record_starts_at_full() {
        let record = recompute(
            "DT-2",
            None,
            [(AnomalyKind::RouteDeviation, Severity::Medium)],
            DeductionPolicy::PerInstance,
            now(),
        );
        assert_eq!(record.current_score, 85);
        assert_eq!(record.factors[&AnomalyKind::RouteDeviation], -15);
    }

    #[test]
    fn recompute_from_zero_baseline_stays_zero() {
        let record = recompute("DT-2", Some(0), [], DeductionPolicy::PerInstance, now());
        assert_eq!(record.current_score, 0);
        assert!(record.factors.is_empty());
    }

    #[test]
    fn recompute_deducts_per_instance() {
        let active = [
            (AnomalyKind::Inactivity, Severity::High),
            (AnomalyKind::Inactivity, Severity::High),
            (AnomalyKind::Inactivity, Severity::High),
        ];
        let record = recompute("DT-3", Some(100), active, DeductionPolicy::PerInstance, now());
        assert_eq!(record.current_score, 55);
        assert_eq!(record.factors[&AnomalyKind::Inactivity], -15);
    }

    #[test]
    fn recompute_capped_per_kind() {
        let active = [
            (AnomalyKind::Inactivity, Severity::High),
            (AnomalyKind::Inactivity, Severity::High),
            (AnomalyKind::Inactivity, Severity::High),
        ];
        let record = recompute("DT-3", Some(100), active, DeductionPolicy::CappedPerKind, now());
        assert_eq!(record.current_score, 85);

        let mixed = [
            (AnomalyKind::AltitudeDrop, Severity::High),
            (AnomalyKind::AltitudeDrop, Severity::Critical),
        ];
        let record = recompute("DT-3", Some(100), mixed, DeductionPolicy::CappedPerKind, now());
        assert_eq!(record.current_score, 60);
        assert_eq!(record.factors[&AnomalyKind::AltitudeDrop], -40);
    }

    #[test]
    fn recompute_last_factor_wins_per_kind() {
        let active = [
            (AnomalyKind::GeofenceBreach, Severity::Critical),
            (AnomalyKind::GeofenceBreach, Severity::High),
            (AnomalyKind::SpeedAnomaly, Severity::Medium),
        ];
        let record = recompute("DT-4", Some(90), active, DeductionPolicy::PerInstance, now());
        assert_eq!(record.current_score, 30);
        assert_eq!(record.factors[&AnomalyKind::GeofenceBreach], -20);
        assert_eq!(record.factors[&AnomalyKind::SpeedAnomaly], -10);
    }

    #[test]
    fn recompute_is_idempotent() {
        let active = vec![
            (AnomalyKind::AltitudeDrop, Severity::Critical),
            (AnomalyKind::RouteDeviation, Severity::High),
        ];
        let first = recompute(
            "DT-5",
            Some(80),
            active.clone(),
            DeductionPolicy::PerInstance,
            now(),
        );
        let second = recompute("DT-5", Some(80), active, DeductionPolicy::PerInstance, now());
        assert_eq!(first, second);
        assert_eq!(first.current_score, 25);
    }

    #[test]
    fn recompute_floors_at_zero() {
        let active = vec![(AnomalyKind::AltitudeDrop, Severity::Critical); 5];
        let record = recompute("DT-6", None, active, DeductionPolicy::PerInstance, now());
        assert_eq!(record.current_score, 0);
    }
}
