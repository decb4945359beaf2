//! Dashboard score listing.

use tourist_safety_geo_models::RiskLevel;
use tourist_safety_score_models::{RankedScore, SafetyScoreRecord};

/// Lists score records lowest-first (ties by DTID), optionally restricted
/// to one band and truncated to `limit`.
#[must_use]
pub fn rank_scores<'a, I>(
    records: I,
    band: Option<RiskLevel>,
    limit: Option<usize>,
) -> Vec<RankedScore>
where
    I: IntoIterator<Item = &'a SafetyScoreRecord>,
{
    let mut ranked: Vec<RankedScore> = records
        .into_iter()
        .map(|record| RankedScore {
            risk_level: record.risk_level(),
            record: record.clone(),
        })
        .filter(|r| band.is_none_or(|b| r.risk_level == b))
        .collect();

    ranked.sort_by(|a, b| {
        a.record
            .current_score
            .cmp(&b.record.current_score)
            .then_with(|| a.record.dtid.cmp(&b.record.dtid))
    });

    if let Some(limit) = limit {
        ranked.truncate(limit);
    }

    ranked
}
