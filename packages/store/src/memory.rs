//! In-memory [`SafetyStore`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tourist_safety_anomaly_models::{AnomalyStatus, NewAnomaly, PersistedAnomaly};
use tourist_safety_geo_models::{ItineraryStop, LocationSample, RestrictedZone};
use tourist_safety_score_models::SafetyScoreRecord;
use uuid::Uuid;

use crate::{HistoryQuery, SafetyStore, Snapshot, StoreError};

#[derive(Debug, Default)]
struct State {
    zones: Vec<RestrictedZone>,
    locations: Vec<LocationSample>,
    itinerary: Vec<ItineraryStop>,
    scores: BTreeMap<String, SafetyScoreRecord>,
    anomalies: Vec<PersistedAnomaly>,
}

/// A [`SafetyStore`] held entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a store from `snapshot`. A later score record for the same
    /// DTID replaces an earlier one.
    #[must_use]
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let Snapshot {
            zones,
            locations,
            itinerary,
            scores,
            anomalies,
        } = snapshot;

        Self {
            state: RwLock::new(State {
                zones,
                locations,
                itinerary,
                scores: scores.into_iter().map(|s| (s.dtid.clone(), s)).collect(),
                anomalies,
            }),
        }
    }

    /// Copies the current contents out as a [`Snapshot`].
    pub async fn snapshot(&self) -> Snapshot {
        let state = self.state.read().await;
        Snapshot {
            zones: state.zones.clone(),
            locations: state.locations.clone(),
            itinerary: state.itinerary.clone(),
            scores: state.scores.values().cloned().collect(),
            anomalies: state.anomalies.clone(),
        }
    }

    #[cfg(test)]
    async fn insert_zone(&self, zone: RestrictedZone) {
        self.state.write().await.zones.push(zone);
    }

    #[cfg(test)]
    async fn insert_itinerary_stop(&self, stop: ItineraryStop) {
        self.state.write().await.itinerary.push(stop);
    }
}

#[async_trait]
impl SafetyStore for MemoryStore {
    async fn active_zones(&self) -> Result<Vec<RestrictedZone>, StoreError> {
        let state = self.state.read().await;
        Ok(state.zones.iter().filter(|z| z.is_active).cloned().collect())
    }

    async fn location_history(
        &self,
        dtid: &str,
        query: &HistoryQuery,
    ) -> Result<Vec<LocationSample>, StoreError> {
        let state = self.state.read().await;
        let mut history: Vec<LocationSample> = state
            .locations
            .iter()
            .filter(|s| s.dtid == dtid && query.contains(s.timestamp))
            .cloned()
            .collect();

        // Newest first; among equal timestamps the later insert comes first.
        history.reverse();
        history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        if let Some(limit) = query.limit {
            history.truncate(limit);
        }

        Ok(history)
    }

    async fn all_locations(&self) -> Result<Vec<LocationSample>, StoreError> {
        Ok(self.state.read().await.locations.clone())
    }

    async fn insert_location(&self, sample: LocationSample) -> Result<LocationSample, StoreError> {
        self.state.write().await.locations.push(sample.clone());
        Ok(sample)
    }

    async fn itinerary(&self, dtid: &str) -> Result<Vec<ItineraryStop>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .itinerary
            .iter()
            .filter(|stop| stop.dtid == dtid)
            .cloned()
            .collect())
    }

    async fn safety_score(&self, dtid: &str) -> Result<Option<SafetyScoreRecord>, StoreError> {
        Ok(self.state.read().await.scores.get(dtid).cloned())
    }

    async fn all_safety_scores(&self) -> Result<Vec<SafetyScoreRecord>, StoreError> {
        Ok(self.state.read().await.scores.values().cloned().collect())
    }

    async fn upsert_safety_score(
        &self,
        record: SafetyScoreRecord,
    ) -> Result<SafetyScoreRecord, StoreError> {
        self.state
            .write()
            .await
            .scores
            .insert(record.dtid.clone(), record.clone());
        Ok(record)
    }

    async fn active_anomalies(&self, dtid: &str) -> Result<Vec<PersistedAnomaly>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .anomalies
            .iter()
            .filter(|a| a.dtid == dtid && a.status == AnomalyStatus::Active)
            .cloned()
            .collect())
    }

    async fn all_active_anomalies(&self) -> Result<Vec<PersistedAnomaly>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .anomalies
            .iter()
            .filter(|a| a.status == AnomalyStatus::Active)
            .cloned()
            .collect())
    }

    async fn insert_anomaly(&self, anomaly: NewAnomaly) -> Result<PersistedAnomaly, StoreError> {
        let NewAnomaly {
            dtid,
            kind,
            severity,
            description,
            location,
            detail,
        } = anomaly;

        let persisted = PersistedAnomaly {
            id: Uuid::new_v4(),
            dtid,
            kind,
            severity,
            description,
            location,
            detail,
            detected_at: Utc::now(),
            status: AnomalyStatus::Active,
        };

        log::debug!(
            "Stored {} anomaly {} for {}",
            persisted.kind,
            persisted.id,
            persisted.dtid
        );

        self.state.write().await.anomalies.push(persisted.clone());
        Ok(persisted)
    }

    async fn resolve_anomaly(&self, id: Uuid) -> Result<PersistedAnomaly, StoreError> {
        let mut state = self.state.write().await;
        let anomaly = state
            .anomalies
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "anomaly",
                key: id.to_string(),
            })?;
        anomaly.status = AnomalyStatus::Resolved;
        Ok(anomaly.clone())
    }
}
