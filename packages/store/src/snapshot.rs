//! JSON snapshot of a whole store.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tourist_safety_anomaly_models::PersistedAnomaly;
use tourist_safety_geo_models::{ItineraryStop, LocationSample, RestrictedZone};
use tourist_safety_score_models::SafetyScoreRecord;

use crate::StoreError;

/// Everything a [`crate::MemoryStore`] holds. Missing sections default to
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub zones: Vec<RestrictedZone>,
    pub locations: Vec<LocationSample>,
    pub itinerary: Vec<ItineraryStop>,
    pub scores: Vec<SafetyScoreRecord>,
    pub anomalies: Vec<PersistedAnomaly>,
}

impl Snapshot {
    /// Reads a snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be read, or
    /// [`StoreError::Json`] if it is not a valid snapshot.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let contents = std::fs::read_to_string(path)?;
        let snapshot: Self = serde_json::from_str(&contents)?;
        log::info!(
            "Loaded snapshot {}: {} zones, {} locations, {} scores, {} anomalies",
            path.display(),
            snapshot.zones.len(),
            snapshot.locations.len(),
            snapshot.scores.len(),
            snapshot.anomalies.len()
        );
        Ok(snapshot)
    }

    /// Writes the snapshot as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Json`] if serialization fails, or
    /// [`StoreError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Wrote snapshot {}", path.display());
        Ok(())
    }
}
