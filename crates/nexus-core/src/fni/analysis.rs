//! Batch-level score adjustments: anomaly detection, time decay,
//! percentile rank.
//!
//! The base engine scores entities in isolation; everything here needs
//! context — either plausibility thresholds tuned against manipulation
//! patterns, or the whole batch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{AnomalyConfig, DecayConfig};
use crate::entity::FusedEntity;
use crate::fni::score::FniScore;

/// Manipulation-pattern flags. Each detected flag shaves 20% off the score
/// multiplier, floored at [`AnomalyConfig::MULTIPLIER_FLOOR`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnomalyFlag {
    /// Downloads-per-like ratio outside plausible bounds.
    #[serde(rename = "UNUSUAL_RATIO")]
    UnusualRatio,
    /// High like count with essentially no content behind it.
    #[serde(rename = "CONTENT_MISMATCH")]
    ContentMismatch,
    /// Velocity far beyond the batch average.
    #[serde(rename = "SUSPICIOUS_GROWTH")]
    SuspiciousGrowth,
}

const FLAG_PENALTY: f64 = 0.2;

/// Detect manipulation patterns for one entity against its batch.
///
/// Returns the flags plus the resulting score multiplier. A clean entity
/// gets `(vec![], 1.0)`.
pub fn detect_anomalies(
    entity: &FusedEntity,
    velocity: f64,
    batch_avg_velocity: f64,
) -> (Vec<AnomalyFlag>, f64) {
    let mut flags = Vec::new();

    if entity.stats.likes > 0 {
        let ratio = entity.stats.downloads as f64 / entity.stats.likes as f64;
        if ratio < AnomalyConfig::MIN_DOWNLOAD_RATIO || ratio > AnomalyConfig::MAX_DOWNLOAD_RATIO {
            flags.push(AnomalyFlag::UnusualRatio);
        }
    }
    if entity.stats.likes >= AnomalyConfig::HIGH_LIKES
        && entity.html_readme.chars().count() < AnomalyConfig::MIN_CONTENT_FOR_HIGH_LIKES
    {
        flags.push(AnomalyFlag::ContentMismatch);
    }
    if batch_avg_velocity > 0.0 && velocity > batch_avg_velocity * AnomalyConfig::GROWTH_MULTIPLIER {
        flags.push(AnomalyFlag::SuspiciousGrowth);
    }

    let multiplier =
        (1.0 - flags.len() as f64 * FLAG_PENALTY).max(AnomalyConfig::MULTIPLIER_FLOOR);
    if !flags.is_empty() {
        debug!(id = %entity.id, ?flags, multiplier, "anomaly flags raised");
    }
    (flags, multiplier)
}

/// Time-decay multiplier for project inactivity.
///
/// Full score within the grace period, then linear decay per day down to
/// the floor. An entity with no known activity date at all is a zombie and
/// takes the flat penalty.
pub fn decay_multiplier(last_modified: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(last) = last_modified else {
        return DecayConfig::ZOMBIE_PENALTY;
    };
    let inactive_days = (now - last).num_seconds() as f64 / 86_400.0;
    if inactive_days <= DecayConfig::GRACE_DAYS {
        return 1.0;
    }
    (1.0 - (inactive_days - DecayConfig::GRACE_DAYS) * DecayConfig::DECAY_PER_DAY)
        .max(DecayConfig::DECAY_FLOOR)
}

/// Assign each score its percentile rank within the batch.
///
/// Rank is the share of other entities scoring strictly lower, so the best
/// entity lands at 100 and the worst at 0. A batch of one ranks 100.
pub fn assign_percentiles(scores: &mut [FniScore]) {
    let n = scores.len();
    if n == 0 {
        return;
    }
    if n == 1 {
        scores[0].percentile = Some(100.0);
        return;
    }
    let totals: Vec<f64> = scores.iter().map(|s| s.total).collect();
    for score in scores.iter_mut() {
        let below = totals.iter().filter(|t| **t < score.total).count();
        score.percentile = Some((below as f64 / (n - 1) as f64 * 100.0).round());
    }
}
