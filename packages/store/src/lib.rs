#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Storage collaborator for the safety engine.
//!
//! [`SafetyStore`] is the only place the engine suspends: every read and
//! write of zones, locations, itineraries, scores, and anomalies goes
//! through it. [`MemoryStore`] is the in-process implementation, seeded
//! from a JSON [`Snapshot`].
//!
//! The store does not serialize score mutations. Callers that
//! read-modify-write a [`SafetyScoreRecord`] hold the DTID's guard from
//! [`TouristLocks`] for the whole cycle.

pub mod locks;
pub mod memory;
pub mod snapshot;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tourist_safety_anomaly_models::{NewAnomaly, PersistedAnomaly};
use tourist_safety_geo_models::{ItineraryStop, LocationSample, RestrictedZone};
use tourist_safety_score_models::SafetyScoreRecord;
use uuid::Uuid;

pub use locks::TouristLocks;
pub use memory::MemoryStore;
pub use snapshot::Snapshot;

/// Errors returned by storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested record does not exist.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Kind of record.
        entity: &'static str,
        /// Key that was looked up.
        key: String,
    },

    /// Snapshot file I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Bounds for a location history read. Every bound is optional; time
/// bounds are inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQuery {
    /// Maximum number of samples returned.
    pub limit: Option<usize>,
    /// Earliest timestamp returned.
    pub from: Option<DateTime<Utc>>,
    /// Latest timestamp returned.
    pub to: Option<DateTime<Utc>>,
}

impl HistoryQuery {
    /// The `limit` most recent samples.
    #[must_use]
    pub const fn latest(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            from: None,
            to: None,
        }
    }

    /// Whether `timestamp` falls within the time bounds.
    #[must_use]
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| timestamp >= from) && self.to.is_none_or(|to| timestamp <= to)
    }
}

/// Persistence for everything the engine reads and writes.
#[async_trait]
pub trait SafetyStore: Send + Sync {
    /// Restricted zones with `is_active == true`.
    async fn active_zones(&self) -> Result<Vec<RestrictedZone>, StoreError>;

    /// A tourist's samples within `query`, most recent first.
    async fn location_history(
        &self,
        dtid: &str,
        query: &HistoryQuery,
    ) -> Result<Vec<LocationSample>, StoreError>;

    /// Every stored sample for every tourist, in insertion order.
    async fn all_locations(&self) -> Result<Vec<LocationSample>, StoreError>;

    /// Appends a sample and returns it.
    async fn insert_location(&self, sample: LocationSample) -> Result<LocationSample, StoreError>;

    /// A tourist's itinerary in stored order.
    async fn itinerary(&self, dtid: &str) -> Result<Vec<ItineraryStop>, StoreError>;

    /// A tourist's score record, if one has been written.
    async fn safety_score(&self, dtid: &str) -> Result<Option<SafetyScoreRecord>, StoreError>;

    /// Every stored score record.
    async fn all_safety_scores(&self) -> Result<Vec<SafetyScoreRecord>, StoreError>;

    /// Inserts or replaces the record for `record.dtid`.
    async fn upsert_safety_score(
        &self,
        record: SafetyScoreRecord,
    ) -> Result<SafetyScoreRecord, StoreError>;

    /// A tourist's anomalies with status active.
    async fn active_anomalies(&self, dtid: &str) -> Result<Vec<PersistedAnomaly>, StoreError>;

    /// Every active anomaly for every tourist.
    async fn all_active_anomalies(&self) -> Result<Vec<PersistedAnomaly>, StoreError>;

    /// Persists an anomaly, assigning its id, detection time, and active
    /// status.
    async fn insert_anomaly(&self, anomaly: NewAnomaly) -> Result<PersistedAnomaly, StoreError>;

    /// Marks an anomaly resolved.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no anomaly has `id`.
    async fn resolve_anomaly(&self, id: Uuid) -> Result<PersistedAnomaly, StoreError>;
}
