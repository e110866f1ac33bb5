//! Base FNI scoring.
//!
//! `total = 0.25·P + 0.25·V + 0.30·C + 0.20·U`, each sub-score on 0–100,
//! the composite rounded to one decimal — persisted scores are tenths, not
//! raw floats. Two guarantees hold throughout: every non-zero contribution produces a
//! commentary line naming the signal and its magnitude (explainability),
//! and absent signals are defaulted visibly, never silently zero-filled
//! (forensic traceability).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::ScoringConfig;
use crate::entity::{EntityStats, EntityType, FusedEntity, RelationKind};
use crate::fni::analysis::AnomalyFlag;

/// Per-component sub-scores, each 0–100.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FniBreakdown {
    pub p: f64,
    pub v: f64,
    pub c: f64,
    pub u: f64,
}

/// A computed FNI score with its audit trail.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FniScore {
    pub total: f64,
    pub breakdown: FniBreakdown,
    pub commentary: Vec<String>,
    #[serde(default)]
    pub anomaly_flags: Vec<AnomalyFlag>,
    /// Rank within the scoring batch, assigned after all entities score.
    #[serde(default)]
    pub percentile: Option<f64>,
}

/// External signals the entity itself does not carry.
#[derive(Debug, Clone, Default)]
pub struct ScoreSignals {
    /// Stats snapshot from the previous (~7 days ago) run, if one exists.
    pub prior_stats: Option<EntityStats>,
    /// Reference time for age computations; `None` means velocity cannot
    /// use the cold-start approximation.
    pub now: Option<DateTime<Utc>>,
    /// Entity is runnable through a hosted inference endpoint.
    pub hosted_inference: bool,
}

/// Round a composite score to one decimal, the precision persisted
/// artifacts carry.
pub(crate) fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Stateless scoring engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct FniEngine;

impl FniEngine {
    pub fn new() -> Self {
        Self
    }

    /// Score one fused entity. Never fails: missing signals degrade to
    /// defaults and are noted in commentary.
    pub fn score(&self, entity: &FusedEntity, signals: &ScoreSignals) -> FniScore {
        let mut commentary = Vec::new();
        let p = self.popularity(entity, &mut commentary);
        let v = self.velocity(entity, signals, &mut commentary);
        let c = self.credibility(entity, &mut commentary);
        let u = self.utility(entity, signals, &mut commentary);

        let total = round_to_tenth(
            (ScoringConfig::WEIGHT_P * p
                + ScoringConfig::WEIGHT_V * v
                + ScoringConfig::WEIGHT_C * c
                + ScoringConfig::WEIGHT_U * u)
                .clamp(0.0, 100.0),
        );
        trace!(id = %entity.id, total, p, v, c, u, "scored entity");

        FniScore {
            total,
            breakdown: FniBreakdown { p, v, c, u },
            commentary,
            anomaly_flags: Vec::new(),
            percentile: None,
        }
    }

    /// Weighted engagement for the entity's type. Spaces have no download
    /// counter; datasets bulk-download and get de-weighted.
    fn weighted_engagement(entity: &FusedEntity, stats: &EntityStats) -> f64 {
        match entity.entity_type {
            EntityType::Space => stats.likes as f64 * ScoringConfig::SPACE_LIKE_WEIGHT,
            EntityType::Dataset => {
                stats.downloads as f64 * ScoringConfig::DATASET_DOWNLOAD_WEIGHT
                    + stats.likes as f64 * ScoringConfig::LIKE_WEIGHT
            }
            _ => stats.downloads as f64 + stats.likes as f64 * ScoringConfig::LIKE_WEIGHT,
        }
    }

    /// P: log-compressed engagement, best of the two source economies.
    ///
    /// Download counts span six orders of magnitude; a linear scale would
    /// pin almost everything to 0 or 100.
    fn popularity(&self, entity: &FusedEntity, commentary: &mut Vec<String>) -> f64 {
        let hub = Self::weighted_engagement(entity, &entity.stats);
        let hub_score = if hub > 0.0 {
            ((1.0 + hub).log10() / ScoringConfig::HF_LOG_ANCHOR * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        let repo = entity.stats.stars as f64 + entity.stats.forks as f64 * ScoringConfig::FORK_WEIGHT;
        let repo_score = if repo > 0.0 {
            ((1.0 + repo).log10() / ScoringConfig::GH_LOG_ANCHOR * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };

        if hub_score > 0.0 {
            commentary.push(format!(
                "P: hub engagement {:.0} (downloads {}, likes {}) -> {:.1}",
                hub, entity.stats.downloads, entity.stats.likes, hub_score
            ));
        }
        if repo_score > 0.0 {
            commentary.push(format!(
                "P: repo engagement {:.0} (stars {}, forks {}) -> {:.1}",
                repo, entity.stats.stars, entity.stats.forks, repo_score
            ));
        }
        if hub_score == 0.0 && repo_score == 0.0 {
            commentary.push("P: no engagement signals present -> 0".to_string());
        }
        hub_score.max(repo_score)
    }

    /// V: 7-day growth delta scaled to 0–100.
    ///
    /// No prior snapshot is a zero-information state, not stagnation: it
    /// maps to the neutral default, visibly. Entities younger than the
    /// snapshot window treat all current engagement as recent gain.
    fn velocity(
        &self,
        entity: &FusedEntity,
        signals: &ScoreSignals,
        commentary: &mut Vec<String>,
    ) -> f64 {
        if let Some(prior) = &signals.prior_stats {
            let current = Self::weighted_engagement(entity, &entity.stats);
            let previous = Self::weighted_engagement(entity, prior);
            let delta = (current - previous).max(0.0);
            let v = (delta / ScoringConfig::MAX_VELOCITY * 100.0).clamp(0.0, 100.0);
            commentary.push(format!("V: 7-day weighted gain {delta:.0} -> {v:.1}"));
            return v;
        }
        if let (Some(now), Some(created)) = (signals.now, entity.created_at) {
            let age_days = (now - created).num_seconds() as f64 / 86_400.0;
            if age_days >= 0.0 && age_days < ScoringConfig::COLD_START_DAYS {
                let gained = Self::weighted_engagement(entity, &entity.stats);
                let v = (gained / ScoringConfig::MAX_VELOCITY * 100.0).clamp(0.0, 100.0);
                commentary.push(format!(
                    "V: cold start ({age_days:.1} days old), all engagement counted as gain -> {v:.1}"
                ));
                return v;
            }
        }
        commentary.push(format!(
            "V: no history snapshot, neutral default {:.0}",
            ScoringConfig::NEUTRAL_VELOCITY
        ));
        ScoringConfig::NEUTRAL_VELOCITY
    }

    /// C: academic grounding, readme richness, author reputation.
    fn credibility(&self, entity: &FusedEntity, commentary: &mut Vec<String>) -> f64 {
        let mut c = 0.0;
        if entity.arxiv_id.is_some() {
            c += ScoringConfig::ARXIV_POINTS;
            commentary.push(format!("C: arXiv reference +{:.0}", ScoringConfig::ARXIV_POINTS));
        }
        if entity.relations.iter().any(|r| r.kind == RelationKind::Cites) {
            c += ScoringConfig::PAPER_RELATION_POINTS;
            commentary.push(format!(
                "C: cites a paper +{:.0}",
                ScoringConfig::PAPER_RELATION_POINTS
            ));
        }
        let readme_len = entity.html_readme.chars().count();
        for tier in ScoringConfig::README_TIERS {
            if readme_len >= tier {
                c += ScoringConfig::README_TIER_POINTS;
                commentary.push(format!(
                    "C: readme >= {tier} chars +{:.0}",
                    ScoringConfig::README_TIER_POINTS
                ));
            }
        }
        let author = entity.author.to_lowercase();
        if !author.is_empty() {
            if ScoringConfig::KNOWN_ORGS.contains(&author.as_str()) {
                c += ScoringConfig::KNOWN_ORG_POINTS;
                commentary.push(format!(
                    "C: known org '{author}' +{:.0}",
                    ScoringConfig::KNOWN_ORG_POINTS
                ));
            } else if author.ends_with("ai") || author.contains("lab") {
                c += ScoringConfig::ORG_HEURISTIC_POINTS;
                commentary.push(format!(
                    "C: org-name heuristic '{author}' +{:.0}",
                    ScoringConfig::ORG_HEURISTIC_POINTS
                ));
            }
        }
        if c == 0.0 {
            commentary.push("C: no credibility signals present -> 0".to_string());
        }
        c.clamp(0.0, 100.0)
    }

    /// U: can you actually run it locally? Runtime availability first,
    /// documentation completeness second.
    fn utility(
        &self,
        entity: &FusedEntity,
        signals: &ScoreSignals,
        commentary: &mut Vec<String>,
    ) -> f64 {
        let mut u = 0.0;
        let has_tag = |needle: &str| entity.tags.iter().any(|t| t.eq_ignore_ascii_case(needle));

        if has_tag("ollama") {
            u += ScoringConfig::OLLAMA_POINTS;
            commentary.push(format!("U: ollama support +{:.0}", ScoringConfig::OLLAMA_POINTS));
        }
        if has_tag("gguf") {
            u += ScoringConfig::GGUF_POINTS;
            commentary.push(format!("U: gguf quantization +{:.0}", ScoringConfig::GGUF_POINTS));
        }
        let readme_len = entity.html_readme.chars().count();
        if readme_len >= ScoringConfig::COMPLETE_README_CHARS {
            u += ScoringConfig::COMPLETE_README_POINTS;
            commentary.push(format!(
                "U: complete readme +{:.0}",
                ScoringConfig::COMPLETE_README_POINTS
            ));
        } else if readme_len >= ScoringConfig::PARTIAL_README_CHARS {
            u += ScoringConfig::COMPLETE_README_POINTS / 2.0;
            commentary.push(format!(
                "U: partial readme +{:.1}",
                ScoringConfig::COMPLETE_README_POINTS / 2.0
            ));
        }
        if has_tag("docker") {
            u += ScoringConfig::DOCKER_POINTS;
            commentary.push(format!("U: docker image +{:.0}", ScoringConfig::DOCKER_POINTS));
        }
        if signals.hosted_inference {
            u += ScoringConfig::INFERENCE_API_POINTS;
            commentary.push(format!(
                "U: hosted inference +{:.0}",
                ScoringConfig::INFERENCE_API_POINTS
            ));
        }
        if u == 0.0 {
            commentary.push("U: no deployability signals present -> 0".to_string());
        }
        u.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entity_with_stats(stats: EntityStats) -> FusedEntity {
        let mut e = FusedEntity::new("org--name", EntityType::Model);
        e.stats = stats;
        e
    }

    #[test]
    fn test_total_is_weighted_sum_and_bounded() {
        let engine = FniEngine::new();
        let mut entity = entity_with_stats(EntityStats {
            likes: 50_000,
            downloads: 90_000_000,
            stars: 200_000,
            forks: 40_000,
        });
        entity.arxiv_id = Some("2310.06825".to_string());
        entity.author = "meta-llama".to_string();
        entity.html_readme = "x".repeat(12_000);
        entity.tags = vec!["gguf".to_string(), "ollama".to_string(), "docker".to_string()];

        let score = engine.score(&entity, &ScoreSignals::default());
        let b = score.breakdown;
        let expected = 0.25 * b.p + 0.25 * b.v + 0.30 * b.c + 0.20 * b.u;
        assert!((score.total - round_to_tenth(expected.clamp(0.0, 100.0))).abs() < 1e-9);
        // The composite is rounded to one decimal.
        assert_eq!(score.total, round_to_tenth(score.total));
        assert!((0.0..=100.0).contains(&score.total));
        for sub in [b.p, b.v, b.c, b.u] {
            assert!((0.0..=100.0).contains(&sub));
        }
    }

    #[test]
    fn test_zero_signal_entity_scores_neutral_velocity_only() {
        let engine = FniEngine::new();
        let score = engine.score(&entity_with_stats(EntityStats::default()), &ScoreSignals::default());
        assert_eq!(score.breakdown.p, 0.0);
        assert_eq!(score.breakdown.v, ScoringConfig::NEUTRAL_VELOCITY);
        assert_eq!(score.breakdown.c, 0.0);
        assert_eq!(score.breakdown.u, 0.0);
        assert!((score.total - 0.25 * ScoringConfig::NEUTRAL_VELOCITY).abs() < 1e-9);
    }

    #[test]
    fn test_missing_history_defaults_neutral_with_commentary() {
        let engine = FniEngine::new();
        let score = engine.score(&entity_with_stats(EntityStats::default()), &ScoreSignals::default());
        assert_eq!(score.breakdown.v, 50.0);
        assert!(score
            .commentary
            .iter()
            .any(|line| line.contains("no history snapshot") && line.contains("50")));
    }

    #[test]
    fn test_velocity_from_prior_snapshot() {
        let engine = FniEngine::new();
        let entity = entity_with_stats(EntityStats { likes: 20, downloads: 600, ..Default::default() });
        let signals = ScoreSignals {
            prior_stats: Some(EntityStats { likes: 10, downloads: 300, ..Default::default() }),
            ..Default::default()
        };
        // Weighted gain: (600 + 20*20) - (300 + 10*20) = 500 -> 50.0
        let score = engine.score(&entity, &signals);
        assert!((score.breakdown.v - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_cold_start_counts_all_engagement() {
        let engine = FniEngine::new();
        let now = Utc.with_ymd_and_hms(2026, 8, 20, 0, 0, 0).unwrap();
        let mut entity = entity_with_stats(EntityStats { likes: 10, ..Default::default() });
        entity.created_at = Some(now - chrono::Duration::days(2));
        let signals = ScoreSignals { now: Some(now), ..Default::default() };
        let score = engine.score(&entity, &signals);
        // 10 likes * 20 = 200 weighted -> 20.0
        assert!((score.breakdown.v - 20.0).abs() < 1e-9);
        assert!(score.commentary.iter().any(|line| line.contains("cold start")));
    }

    #[test]
    fn test_every_nonzero_contribution_has_commentary() {
        let engine = FniEngine::new();
        let mut entity = entity_with_stats(EntityStats { likes: 100, stars: 500, ..Default::default() });
        entity.author = "mistralai".to_string();
        entity.html_readme = "x".repeat(600);
        entity.tags = vec!["gguf".to_string()];
        let score = engine.score(&entity, &ScoreSignals::default());
        assert!(!score.commentary.is_empty());
        assert!(score.commentary.iter().any(|l| l.starts_with("P:")));
        assert!(score.commentary.iter().any(|l| l.starts_with("V:")));
        assert!(score.commentary.iter().any(|l| l.starts_with("C:")));
        assert!(score.commentary.iter().any(|l| l.starts_with("U:")));
    }

    #[test]
    fn test_space_scores_on_likes_only() {
        let engine = FniEngine::new();
        let mut space = FusedEntity::new("org--space", EntityType::Space);
        space.stats = EntityStats { likes: 100, downloads: 1_000_000, ..Default::default() };
        let mut model = FusedEntity::new("org--model", EntityType::Model);
        model.stats = space.stats;
        let space_p = engine.score(&space, &ScoreSignals::default()).breakdown.p;
        let model_p = engine.score(&model, &ScoreSignals::default()).breakdown.p;
        // 100 likes * 100 = 10_000 weighted for the space; the model also
        // counts its million downloads.
        assert!(space_p < model_p);
        assert!(space_p > 0.0);
    }
}
