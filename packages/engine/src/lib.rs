#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Tourist safety engine.
//!
//! Orchestrates the pure detectors, zone index, score ledger, and
//! clustering over a [`SafetyStore`]. Two paths mutate scores:
//!
//! - **Location update** ([`SafetyEngine::record_location`]): the sample
//!   is stored and checked against active zones; a breach is persisted as
//!   an anomaly and applied to the score immediately.
//! - **Recompute** ([`SafetyEngine::recompute`]): all detectors run over
//!   recent history, new anomalies are persisted, and the score is rebuilt
//!   from the active anomaly set.
//!
//! Both paths hold the tourist's [`TouristLocks`] guard for their whole
//! read-modify-write cycle, so concurrent updates for one DTID never
//! clobber each other.

pub mod alerts;
pub mod config;
pub mod error;

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tourist_safety_anomaly::{DetectionInput, detect_all, detect_geofence_breach};
use tourist_safety_anomaly_models::{
    AnomalyKind, AnomalyVerdict, NewAnomaly, PersistedAnomaly, Severity,
};
use tourist_safety_cluster::{ClusterReport, build_report};
use tourist_safety_geo::zones::{GeofenceStatus, geofence_status};
use tourist_safety_geo_models::{Coordinate, LocationSample, RestrictedZone, RiskLevel};
use tourist_safety_score::{apply_delta, geofence_delta, rank_scores};
use tourist_safety_score_models::{MAX_SCORE, RankedScore, SafetyScoreRecord};
use tourist_safety_store::{HistoryQuery, SafetyStore, TouristLocks};
use uuid::Uuid;

pub use alerts::{AlertCounts, AlertSummary, alert_summary};
pub use config::{ConfigError, EngineConfig, load_config, parse_config};
pub use error::EngineError;

/// What a geofence breach did to the tourist's record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreachOutcome {
    /// The geofence detector's verdict.
    pub verdict: AnomalyVerdict,
    /// The anomaly as stored.
    pub anomaly: PersistedAnomaly,
    /// The score after the breach deduction.
    pub score: SafetyScoreRecord,
}

/// Geofence report for one point plus any breach handling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeofenceCheck {
    #[serde(flatten)]
    pub status: GeofenceStatus,
    /// Present only when the point is inside an active zone.
    pub breach: Option<BreachOutcome>,
}

/// Result of [`SafetyEngine::record_location`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationUpdate {
    /// The stored sample.
    pub sample: LocationSample,
    pub geofence: GeofenceCheck,
}

/// Result of [`SafetyEngine::recompute`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecomputeOutcome {
    /// The stored score after recompute.
    pub score: SafetyScoreRecord,
    /// Band of the new score.
    pub risk_level: RiskLevel,
    /// One verdict per detector, in detector order.
    pub verdicts: Vec<AnomalyVerdict>,
    /// Anomalies newly persisted by this run.
    pub new_anomalies: Vec<PersistedAnomaly>,
    /// Active anomalies the score was rebuilt from.
    pub active_anomalies_count: usize,
    /// Timestamp of the newest stored sample, if any.
    pub last_location_update: Option<DateTime<Utc>>,
    pub score_history: ScoreHistory,
}

/// Where a score stands relative to a fresh record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreHistory {
    pub initial_score: u8,
    pub current_score: u8,
    /// `current_score - initial_score`.
    pub score_change: i32,
}

impl ScoreHistory {
    #[must_use]
    pub fn from_current(current_score: u8) -> Self {
        Self {
            initial_score: MAX_SCORE,
            current_score,
            score_change: i32::from(current_score) - i32::from(MAX_SCORE),
        }
    }
}

/// The safety engine over a storage collaborator.
pub struct SafetyEngine<S: SafetyStore> {
    store: S,
    config: EngineConfig,
    locks: TouristLocks,
}

impl<S: SafetyStore> SafetyEngine<S> {
    #[must_use]
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self {
            store,
            config,
            locks: TouristLocks::new(),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Stores a location sample and handles any geofence breach it causes.
    ///
    /// The breach deduction is stamped with the sample's timestamp.
    ///
    /// # Errors
    ///
    /// * [`EngineError::InvalidInput`] for an empty DTID or a bad accuracy
    /// * [`EngineError::InvalidCoordinate`] for an out-of-range coordinate
    /// * [`EngineError::Store`] if storage fails
    pub async fn record_location(
        &self,
        sample: LocationSample,
    ) -> Result<LocationUpdate, EngineError> {
        validate_dtid(&sample.dtid)?;
        sample.coordinate.validate()?;
        if let Some(accuracy) = sample.accuracy
            && !(accuracy.is_finite() && accuracy >= 0.0)
        {
            return Err(EngineError::invalid(format!(
                "accuracy must be a non-negative number, got {accuracy}"
            )));
        }

        let sample = self.store.insert_location(sample).await?;
        log::debug!(
            "Location for {}: ({}, {})",
            sample.dtid,
            sample.coordinate.latitude,
            sample.coordinate.longitude
        );

        let geofence = self
            .check_point(&sample.dtid, &sample.coordinate, sample.timestamp)
            .await?;

        Ok(LocationUpdate { sample, geofence })
    }

    /// Checks `point` against the active zones for `dtid` without storing a
    /// sample. A breach is handled exactly as on a location update.
    ///
    /// # Errors
    ///
    /// * [`EngineError::InvalidInput`] for an empty DTID
    /// * [`EngineError::InvalidCoordinate`] for an out-of-range coordinate
    /// * [`EngineError::Store`] if storage fails
    pub async fn check_geofence(
        &self,
        dtid: &str,
        point: Coordinate,
        now: DateTime<Utc>,
    ) -> Result<GeofenceCheck, EngineError> {
        validate_dtid(dtid)?;
        point.validate()?;
        self.check_point(dtid, &point, now).await
    }

    async fn check_point(
        &self,
        dtid: &str,
        point: &Coordinate,
        now: DateTime<Utc>,
    ) -> Result<GeofenceCheck, EngineError> {
        let zones = self.store.active_zones().await?;
        let status = geofence_status(
            point,
            &zones,
            self.config.nearby_radius_meters,
            self.config.nearby_limit,
        );

        let Some(zone_risk) = status.risk_level else {
            return Ok(GeofenceCheck {
                status,
                breach: None,
            });
        };

        let verdict = detect_geofence_breach(point, &zones);
        let Some(new_anomaly) = NewAnomaly::from_verdict(dtid, &verdict, Some(*point)) else {
            return Ok(GeofenceCheck {
                status,
                breach: None,
            });
        };

        let _guard = self.locks.lock(dtid).await;

        let anomaly = self.store.insert_anomaly(new_anomaly).await?;
        let record = self
            .store
            .safety_score(dtid)
            .await?
            .unwrap_or_else(|| SafetyScoreRecord::new(dtid, now));
        let record = apply_delta(
            record,
            AnomalyKind::GeofenceBreach,
            geofence_delta(zone_risk),
            now,
        );
        let score = self.store.upsert_safety_score(record).await?;

        log::warn!(
            "{dtid} breached {} zone(s); score now {}",
            status.breached_zones.len(),
            score.current_score
        );

        Ok(GeofenceCheck {
            status,
            breach: Some(BreachOutcome {
                verdict,
                anomaly,
                score,
            }),
        })
    }

    /// Runs every detector for `dtid` as of `now`, persists new anomalies,
    /// and rebuilds the score from the active anomaly set.
    ///
    /// An anomalous verdict is persisted only if no active anomaly of the
    /// same kind is already on record.
    ///
    /// # Errors
    ///
    /// * [`EngineError::InvalidInput`] for an empty DTID
    /// * [`EngineError::Store`] if storage fails
    pub async fn recompute(
        &self,
        dtid: &str,
        now: DateTime<Utc>,
    ) -> Result<RecomputeOutcome, EngineError> {
        validate_dtid(dtid)?;

        let history = self
            .store
            .location_history(dtid, &HistoryQuery::latest(self.config.history_limit))
            .await?;
        let itinerary = self.store.itinerary(dtid).await?;
        let zones = self.store.active_zones().await?;

        let input = DetectionInput {
            history: &history,
            itinerary: &itinerary,
            zones: &zones,
        };
        let verdicts = detect_all(&input, &self.config.detectors, now);
        let location = history.first().map(|s| s.coordinate);

        let _guard = self.locks.lock(dtid).await;

        let mut on_record: BTreeSet<AnomalyKind> = self
            .store
            .active_anomalies(dtid)
            .await?
            .iter()
            .map(|a| a.kind)
            .collect();

        let mut new_anomalies = Vec::new();
        for verdict in &verdicts {
            let Some(anomaly) = NewAnomaly::from_verdict(dtid, verdict, location) else {
                continue;
            };
            if on_record.insert(anomaly.kind) {
                new_anomalies.push(self.store.insert_anomaly(anomaly).await?);
            } else {
                log::debug!("{dtid}: {} already active, not stored again", anomaly.kind);
            }
        }

        let active = self.store.active_anomalies(dtid).await?;
        let baseline = self
            .store
            .safety_score(dtid)
            .await?
            .map(|r| r.current_score);

        let record = tourist_safety_score::recompute(
            dtid,
            baseline,
            active.iter().map(|a| (a.kind, a.severity)),
            self.config.deduction_policy,
            now,
        );
        let score = self.store.upsert_safety_score(record).await?;

        Ok(RecomputeOutcome {
            risk_level: score.risk_level(),
            score_history: ScoreHistory::from_current(score.current_score),
            score,
            verdicts,
            new_anomalies,
            active_anomalies_count: active.len(),
            last_location_update: history.first().map(|s| s.timestamp),
        })
    }

    /// A tourist's stored samples within `query`, most recent first.
    /// `HistoryQuery::latest(1)` yields the current location.
    ///
    /// # Errors
    ///
    /// * [`EngineError::InvalidInput`] for an empty DTID or `from` after `to`
    /// * [`EngineError::Store`] if storage fails
    pub async fn location_history(
        &self,
        dtid: &str,
        query: HistoryQuery,
    ) -> Result<Vec<LocationSample>, EngineError> {
        validate_dtid(dtid)?;
        if let (Some(from), Some(to)) = (query.from, query.to)
            && from > to
        {
            return Err(EngineError::invalid(format!(
                "history range is empty: {from} is after {to}"
            )));
        }

        let history = self.store.location_history(dtid, &query).await?;
        log::debug!("{dtid}: {} samples for {query:?}", history.len());
        Ok(history)
    }

    /// The tourist's most recent sample, if any.
    ///
    /// # Errors
    ///
    /// Same as [`SafetyEngine::location_history`].
    pub async fn latest_location(&self, dtid: &str) -> Result<Option<LocationSample>, EngineError> {
        let mut history = self.location_history(dtid, HistoryQuery::latest(1)).await?;
        Ok(history.pop())
    }

    /// Restricted zones currently enforced.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if storage fails.
    pub async fn zones(&self) -> Result<Vec<RestrictedZone>, EngineError> {
        Ok(self.store.active_zones().await?)
    }

    /// Clusters every tourist's latest position. Uses the configured radius
    /// when `radius_meters` is `None`.
    ///
    /// # Errors
    ///
    /// * [`EngineError::InvalidInput`] for a non-positive radius
    /// * [`EngineError::Store`] if storage fails
    pub async fn dashboard_clusters(
        &self,
        radius_meters: Option<f64>,
    ) -> Result<ClusterReport, EngineError> {
        let radius = radius_meters.unwrap_or(self.config.cluster_radius_meters);
        if !(radius.is_finite() && radius > 0.0) {
            return Err(EngineError::invalid(format!(
                "cluster radius must be positive, got {radius}"
            )));
        }

        let locations = self.store.all_locations().await?;
        let report = build_report(&locations, radius);
        log::info!(
            "Dashboard clusters: {} tourists in {} clusters",
            report.total_tourists,
            report.cluster_count
        );
        Ok(report)
    }

    /// Builds the dashboard alert summary.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if storage fails.
    pub async fn alerts(
        &self,
        severity: Option<Severity>,
        limit: Option<usize>,
    ) -> Result<AlertSummary, EngineError> {
        let anomalies = self.store.all_active_anomalies().await?;
        let scores = self.store.all_safety_scores().await?;
        Ok(alert_summary(
            anomalies,
            &scores,
            self.config.low_score_threshold,
            severity,
            limit,
        ))
    }

    /// Lists stored scores lowest first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if storage fails.
    pub async fn scores(
        &self,
        band: Option<RiskLevel>,
        limit: Option<usize>,
    ) -> Result<Vec<RankedScore>, EngineError> {
        let records = self.store.all_safety_scores().await?;
        Ok(rank_scores(&records, band, limit))
    }

    /// Marks an anomaly resolved so it stops counting on the next
    /// recompute.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if the anomaly does not exist or
    /// storage fails.
    pub async fn resolve_anomaly(&self, id: Uuid) -> Result<PersistedAnomaly, EngineError> {
        let anomaly = self.store.resolve_anomaly(id).await?;
        log::info!("Resolved {} anomaly {id} for {}", anomaly.kind, anomaly.dtid);
        Ok(anomaly)
    }
}

fn validate_dtid(dtid: &str) -> Result<(), EngineError> {
    if dtid.trim().is_empty() {
        return Err(EngineError::invalid("dtid must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone as _};
    use tourist_safety_anomaly_models::AnomalyDetail;
    use tourist_safety_geo_models::{ItineraryStop, RestrictedZone, StopStatus};
    use tourist_safety_score_models::DeductionPolicy;
    use tourist_safety_store::{MemoryStore, Snapshot, StoreError};

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap()
    }

    fn zone(id: &str, lat: f64, lng: f64, radius: f64, risk: RiskLevel) -> RestrictedZone {
        RestrictedZone {
            id: id.to_string(),
            name: format!("Zone {id}"),
            center: Coordinate::new(lat, lng),
            radius_meters: radius,
            risk_level: risk,
            zone_type: "wildlife".to_string(),
            is_active: true,
        }
    }

    fn sample(dtid: &str, lat: f64, lng: f64, ts: DateTime<Utc>) -> LocationSample {
        LocationSample {
            dtid: dtid.to_string(),
            coordinate: Coordinate::new(lat, lng),
            accuracy: Some(5.0),
            timestamp: ts,
        }
    }

    fn engine(snapshot: Snapshot) -> SafetyEngine<MemoryStore> {
        SafetyEngine::new(MemoryStore::from_snapshot(snapshot), EngineConfig::default())
    }

    #[tokio::test]
    async fn critical_zone_breach_scores_seventy() {
        let engine = engine(Snapshot {
            zones: vec![zone("z1", 27.1751, 78.0421, 500.0, RiskLevel::Critical)],
            ..Snapshot::default()
        });

        let update = engine
            .record_location(sample("DT-1", 27.1752, 78.0421, t0()))
            .await
            .unwrap();

        assert!(update.geofence.status.inside);
        let breach = update.geofence.breach.unwrap();
        assert_eq!(breach.score.current_score, 70);
        assert_eq!(breach.score.factors[&AnomalyKind::GeofenceBreach], -30);
        assert_eq!(breach.anomaly.description, "Entered restricted zone: Zone z1");

        let active = engine.store().active_anomalies("DT-1").await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].kind, AnomalyKind::GeofenceBreach);
        assert_eq!(active[0].severity, Severity::Critical);

        let stored = engine.store().safety_score("DT-1").await.unwrap().unwrap();
        assert_eq!(stored.current_score, 70);
    }

    #[tokio::test]
    async fn non_critical_breach_deducts_twenty() {
        let engine = engine(Snapshot {
            zones: vec![zone("z1", 10.0, 10.0, 1_000.0, RiskLevel::Low)],
            ..Snapshot::default()
        });
        let check = engine
            .check_geofence("DT-2", Coordinate::new(10.0, 10.0), t0())
            .await
            .unwrap();
        let breach = check.breach.unwrap();
        assert_eq!(breach.score.current_score, 80);
        assert_eq!(breach.anomaly.severity, Severity::Medium);
        assert!(
            engine.store().all_locations().await.unwrap().is_empty(),
            "geofence check must not store a sample"
        );
    }

    #[tokio::test]
    async fn outside_zones_leaves_score_alone() {
        let engine = engine(Snapshot {
            zones: vec![zone("z1", 10.0, 10.0, 1_000.0, RiskLevel::High)],
            ..Snapshot::default()
        });
        let update = engine
            .record_location(sample("DT-3", 10.05, 10.0, t0()))
            .await
            .unwrap();
        assert!(!update.geofence.status.inside);
        assert!(update.geofence.breach.is_none());
        assert_eq!(update.geofence.status.nearby_zones.len(), 1);
        assert!(engine.store().safety_score("DT-3").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_inputs_are_rejected() {
        let engine = engine(Snapshot::default());

        let err = engine
            .record_location(sample("  ", 0.0, 0.0, t0()))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));

        let err = engine
            .record_location(sample("DT-1", 91.0, 0.0, t0()))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidCoordinate(_)));

        let mut bad_accuracy = sample("DT-1", 0.0, 0.0, t0());
        bad_accuracy.accuracy = Some(-1.0);
        let err = engine.record_location(bad_accuracy).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));

        let err = engine.dashboard_clusters(Some(0.0)).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));

        assert!(engine.store().all_locations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn recompute_without_history_keeps_full_score() {
        let engine = engine(Snapshot::default());
        let outcome = engine.recompute("DT-9", t0()).await.unwrap();
        assert_eq!(outcome.score.current_score, 100);
        assert_eq!(outcome.risk_level, RiskLevel::Low);
        assert_eq!(outcome.verdicts.len(), 5);
        assert!(outcome.new_anomalies.is_empty());
    }

    #[tokio::test]
    async fn recompute_persists_and_deducts() {
        // Last seen 90 minutes ago, 20+ km from the active destination.
        let engine = engine(Snapshot {
            locations: vec![sample("DT-4", 28.8, 77.2, t0())],
            itinerary: vec![ItineraryStop {
                dtid: "DT-4".to_string(),
                destination: Coordinate::new(28.6, 77.2),
                destination_name: "Old Fort".to_string(),
                status: StopStatus::InProgress,
            }],
            ..Snapshot::default()
        });

        let now = t0() + Duration::minutes(90);
        let outcome = engine.recompute("DT-4", now).await.unwrap();

        let kinds: Vec<AnomalyKind> = outcome.new_anomalies.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![AnomalyKind::Inactivity, AnomalyKind::RouteDeviation]
        );
        // -15 (inactivity, high) -15 (route deviation)
        assert_eq!(outcome.score.current_score, 70);
        assert_eq!(outcome.score.last_updated, now);
        assert_eq!(outcome.active_anomalies_count, 2);
        assert_eq!(outcome.last_location_update, Some(t0()));
        assert_eq!(
            outcome.score_history,
            ScoreHistory {
                initial_score: 100,
                current_score: 70,
                score_change: -30,
            }
        );

        // A second run does not duplicate active anomalies; it deducts again
        // from the stored score.
        let again = engine.recompute("DT-4", now).await.unwrap();
        assert!(again.new_anomalies.is_empty());
        assert_eq!(engine.store().active_anomalies("DT-4").await.unwrap().len(), 2);
        assert_eq!(again.score.current_score, 40);
        assert_eq!(again.active_anomalies_count, 2);
        assert_eq!(again.score_history.score_change, -60);
    }

    #[tokio::test]
    async fn recompute_summary_without_history() {
        let engine = engine(Snapshot::default());
        let outcome = engine.recompute("DT-9", t0()).await.unwrap();
        assert_eq!(outcome.active_anomalies_count, 0);
        assert_eq!(outcome.last_location_update, None);
        assert_eq!(outcome.score_history.score_change, 0);
    }

    #[tokio::test]
    async fn history_and_latest_location() {
        let minute = Duration::minutes(1);
        let engine = engine(Snapshot {
            locations: vec![
                sample("DT-7", 10.0, 10.0, t0()),
                sample("DT-7", 10.1, 10.0, t0() + minute * 10),
                sample("DT-8", 50.0, 50.0, t0() + minute * 20),
                sample("DT-7", 10.2, 10.0, t0() + minute * 20),
            ],
            ..Snapshot::default()
        });

        let all = engine
            .location_history("DT-7", HistoryQuery::default())
            .await
            .unwrap();
        let stamps: Vec<DateTime<Utc>> = all.iter().map(|s| s.timestamp).collect();
        assert_eq!(stamps, vec![t0() + minute * 20, t0() + minute * 10, t0()]);

        let window = HistoryQuery {
            limit: None,
            from: Some(t0() + minute * 5),
            to: Some(t0() + minute * 10),
        };
        let windowed = engine.location_history("DT-7", window).await.unwrap();
        assert_eq!(windowed.len(), 1);
        assert!((windowed[0].coordinate.latitude - 10.1).abs() < f64::EPSILON);

        let latest = engine.latest_location("DT-7").await.unwrap().unwrap();
        assert_eq!(latest.timestamp, t0() + minute * 20);
        assert!((latest.coordinate.latitude - 10.2).abs() < f64::EPSILON);
        assert!(engine.latest_location("DT-0").await.unwrap().is_none());

        let backwards = HistoryQuery {
            limit: None,
            from: Some(t0() + minute),
            to: Some(t0()),
        };
        let err = engine.location_history("DT-7", backwards).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));
        let err = engine
            .location_history("", HistoryQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn zones_lists_only_active() {
        let mut closed = zone("z2", 1.0, 1.0, 100.0, RiskLevel::Low);
        closed.is_active = false;
        let engine = engine(Snapshot {
            zones: vec![zone("z1", 0.0, 0.0, 100.0, RiskLevel::High), closed],
            ..Snapshot::default()
        });
        let zones = engine.zones().await.unwrap();
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].id, "z1");
    }

    #[tokio::test]
    async fn recompute_honors_capped_policy() {
        let store = MemoryStore::new();
        for _ in 0..3 {
            store
                .insert_anomaly(NewAnomaly {
                    dtid: "DT-5".to_string(),
                    kind: AnomalyKind::Inactivity,
                    severity: Severity::High,
                    description: "No location update".to_string(),
                    location: None,
                    detail: AnomalyDetail::Inactivity {
                        last_update_minutes: 120,
                        threshold_minutes: 30.0,
                    },
                })
                .await
                .unwrap();
        }
        let config = EngineConfig {
            deduction_policy: DeductionPolicy::CappedPerKind,
            ..EngineConfig::default()
        };
        let engine = SafetyEngine::new(store, config);
        let outcome = engine.recompute("DT-5", t0()).await.unwrap();
        assert_eq!(outcome.score.current_score, 85);

        let per_instance = SafetyEngine::new(
            MemoryStore::from_snapshot(engine.store().snapshot().await),
            EngineConfig::default(),
        );
        let reset = SafetyScoreRecord::new("DT-5", t0());
        per_instance.store().upsert_safety_score(reset).await.unwrap();
        let outcome = per_instance.recompute("DT-5", t0()).await.unwrap();
        assert_eq!(outcome.score.current_score, 55);
    }

    #[tokio::test]
    async fn resolved_anomalies_stop_counting() {
        let engine = engine(Snapshot {
            zones: vec![zone("z1", 0.0, 0.0, 1_000.0, RiskLevel::Critical)],
            ..Snapshot::default()
        });
        let update = engine
            .record_location(sample("DT-6", 0.0, 0.0, t0()))
            .await
            .unwrap();
        let id = update.geofence.breach.unwrap().anomaly.id;

        engine.resolve_anomaly(id).await.unwrap();
        assert!(engine.store().active_anomalies("DT-6").await.unwrap().is_empty());

        let err = engine.resolve_anomaly(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, EngineError::Store(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn dashboard_views() {
        let engine = engine(Snapshot {
            zones: vec![zone("z1", 28.61, 77.21, 500.0, RiskLevel::High)],
            locations: vec![
                sample("DT-1", 28.6139, 77.2090, t0()),
                sample("DT-2", 28.6200, 77.2150, t0()),
                sample("DT-3", 29.0639, 77.2090, t0()),
            ],
            ..Snapshot::default()
        });

        let report = engine.dashboard_clusters(None).await.unwrap();
        assert_eq!(report.total_tourists, 3);
        assert_eq!(report.cluster_count, 2);
        assert!((report.clustering_radius_meters - 5_000.0).abs() < f64::EPSILON);

        engine
            .record_location(sample("DT-1", 28.61, 77.21, t0() + Duration::minutes(1)))
            .await
            .unwrap();

        let alerts = engine.alerts(None, None).await.unwrap();
        assert_eq!(alerts.summary.geofence_breaches, 1);
        assert_eq!(alerts.summary.high_count, 1);
        assert_eq!(alerts.summary.low_safety_scores, 0);

        let scores = engine.scores(None, None).await.unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].record.current_score, 80);
        assert_eq!(scores[0].risk_level, RiskLevel::Low);
    }
}
