//! Dashboard alert summary.

use serde::Serialize;
use tourist_safety_anomaly_models::{AnomalyKind, AnomalyStatus, PersistedAnomaly, Severity};
use tourist_safety_score::rank_scores;
use tourist_safety_score_models::{RankedScore, SafetyScoreRecord};

/// Alert counts shown in the dashboard header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlertCounts {
    pub total_alerts: usize,
    pub critical_count: usize,
    pub high_count: usize,
    pub medium_count: usize,
    pub geofence_breaches: usize,
    pub low_safety_scores: usize,
}

/// Active alerts grouped by priority.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertSummary {
    pub summary: AlertCounts,
    /// Listed anomalies with critical severity, newest first.
    pub critical: Vec<PersistedAnomaly>,
    pub high: Vec<PersistedAnomaly>,
    pub medium: Vec<PersistedAnomaly>,
    /// Every active geofence breach, newest first. Not affected by the
    /// severity filter or limit.
    pub geofence_breaches: Vec<PersistedAnomaly>,
    /// Scores below the low-score threshold, lowest first.
    pub low_safety_scores: Vec<RankedScore>,
}

/// Builds the alert summary from active anomalies and stored scores.
///
/// Anomalies are ordered newest first, then filtered by `severity` and
/// truncated to `limit` before being grouped.
#[must_use]
pub fn alert_summary(
    mut anomalies: Vec<PersistedAnomaly>,
    scores: &[SafetyScoreRecord],
    low_score_threshold: u8,
    severity: Option<Severity>,
    limit: Option<usize>,
) -> AlertSummary {
    anomalies.retain(|a| a.status == AnomalyStatus::Active);
    anomalies.sort_by(|a, b| b.detected_at.cmp(&a.detected_at));

    let geofence_breaches: Vec<PersistedAnomaly> = anomalies
        .iter()
        .filter(|a| a.kind == AnomalyKind::GeofenceBreach)
        .cloned()
        .collect();

    let mut listed: Vec<PersistedAnomaly> = anomalies
        .into_iter()
        .filter(|a| severity.is_none_or(|s| a.severity == s))
        .collect();
    if let Some(limit) = limit {
        listed.truncate(limit);
    }

    let mut critical = Vec::new();
    let mut high = Vec::new();
    let mut medium = Vec::new();
    for anomaly in listed {
        match anomaly.severity {
            Severity::Critical => critical.push(anomaly),
            Severity::High => high.push(anomaly),
            Severity::Medium => medium.push(anomaly),
        }
    }

    let low_safety_scores = rank_scores(
        scores
            .iter()
            .filter(|r| r.current_score < low_score_threshold),
        None,
        None,
    );

    AlertSummary {
        summary: AlertCounts {
            total_alerts: critical.len() + high.len() + medium.len(),
            critical_count: critical.len(),
            high_count: high.len(),
            medium_count: medium.len(),
            geofence_breaches: geofence_breaches.len(),
            low_safety_scores: low_safety_scores.len(),
        },
        critical,
        high,
        medium,
        geofence_breaches,
        low_safety_scores,
    }
}
