//! Full resolution/scoring pipeline over one immutable input snapshot.
//!
//! Phases: normalize and group raw records by CanonicalId, fuse each group,
//! build the knowledge graph, score with batch-level adjustments. Pure
//! transformation — no I/O happens here, and distinct entities have no
//! ordering dependency on each other.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{info, warn};

use crate::config::StorageConfig;
use crate::entity::{EntityStats, EntityType, FusedEntity, RawRecord};
use crate::fni::{analysis, FniEngine, ScoreSignals};
use crate::graph::KnowledgeGraph;
use crate::identity::IdNormalizer;

/// Batch-level inputs that do not live on the records themselves.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Reference time for velocity cold start and decay.
    pub now: DateTime<Utc>,
    /// Previous-run stats snapshots keyed by CanonicalId.
    pub prior_stats: BTreeMap<String, EntityStats>,
    /// CanonicalIds runnable through a hosted inference endpoint.
    pub hosted_inference: BTreeSet<String>,
}

impl RunContext {
    pub fn new(now: DateTime<Utc>) -> Self {
        RunContext {
            now,
            prior_stats: BTreeMap::new(),
            hosted_inference: BTreeSet::new(),
        }
    }
}

/// Output of one pipeline run: the fused, scored entity set and its graph.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub entities: Vec<FusedEntity>,
    pub graph: KnowledgeGraph,
}

/// The resolution/scoring pipeline.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    normalizer: IdNormalizer,
    engine: FniEngine,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_normalizer(normalizer: IdNormalizer) -> Self {
        Pipeline { normalizer, engine: FniEngine::new() }
    }

    /// Run the full pipeline over one record snapshot.
    ///
    /// Records whose identifier normalizes to empty are unresolvable and
    /// skipped. Everything else always produces a well-formed output.
    pub fn run(&self, records: &[RawRecord], ctx: &RunContext) -> RunOutput {
        let entities = self.fuse(records);
        let graph = KnowledgeGraph::build(&entities, &self.normalizer);
        let entities = self.score(entities, ctx);
        info!(
            records = records.len(),
            entities = entities.len(),
            graph_nodes = graph.len(),
            "pipeline run complete"
        );
        RunOutput { entities, graph }
    }

    /// Group records by CanonicalId (first-seen order) and fuse each group.
    fn fuse(&self, records: &[RawRecord]) -> Vec<FusedEntity> {
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<&RawRecord>> = HashMap::new();
        let mut skipped = 0usize;
        for record in records {
            let id = self.normalizer.normalize(&record.id);
            if id.is_empty() {
                skipped += 1;
                continue;
            }
            groups
                .entry(id.clone())
                .or_insert_with(|| {
                    order.push(id);
                    Vec::new()
                })
                .push(record);
        }
        if skipped > 0 {
            warn!(skipped, "records with unresolvable identifiers skipped");
        }

        order
            .into_iter()
            .map(|id| {
                let group = &groups[&id];
                let entity_type = group
                    .iter()
                    .find_map(|r| r.entity_type)
                    .unwrap_or(EntityType::Model);
                let mut fused = FusedEntity::new(id, entity_type);
                for record in group {
                    fused.absorb(record, &self.normalizer);
                }
                fused
            })
            .collect()
    }

    /// Score the batch: base scores, anomaly multiplier against the batch
    /// average velocity, time decay, percentile rank.
    fn score(&self, mut entities: Vec<FusedEntity>, ctx: &RunContext) -> Vec<FusedEntity> {
        let mut scores: Vec<_> = entities
            .iter()
            .map(|entity| {
                let signals = ScoreSignals {
                    prior_stats: ctx.prior_stats.get(&entity.id).copied(),
                    now: Some(ctx.now),
                    hosted_inference: ctx.hosted_inference.contains(&entity.id),
                };
                self.engine.score(entity, &signals)
            })
            .collect();

        let avg_velocity = if scores.is_empty() {
            0.0
        } else {
            scores.iter().map(|s| s.breakdown.v).sum::<f64>() / scores.len() as f64
        };

        for (entity, score) in entities.iter_mut().zip(scores.iter_mut()) {
            let (flags, anomaly_mult) =
                analysis::detect_anomalies(entity, score.breakdown.v, avg_velocity);
            if anomaly_mult < 1.0 {
                score
                    .commentary
                    .push(format!("Anomaly multiplier {anomaly_mult:.2} ({flags:?})"));
            }
            let decay = analysis::decay_multiplier(entity.last_modified, ctx.now);
            if decay < 1.0 {
                score.commentary.push(format!("Inactivity decay {decay:.3}"));
            }
            score.anomaly_flags = flags;
            // Multipliers reintroduce raw floats; re-round so persisted
            // scores stay at one decimal.
            score.total = crate::fni::score::round_to_tenth(
                (score.total * anomaly_mult * decay).clamp(0.0, 100.0),
            );
        }

        analysis::assign_percentiles(&mut scores);

        for (entity, score) in entities.iter_mut().zip(scores) {
            entity.fni_score = score.total;
            entity.fni = Some(score);
        }
        entities
    }
}

/// Split a fused set into persistence shards.
///
/// Each shard respects both the entity-count and the serialized-byte
/// ceiling; entity order is preserved. The ceilings exist for downstream
/// storage/CPU quotas only — shards have no correctness coupling. An
/// entity that alone exceeds the byte ceiling still ships, as its own
/// shard.
pub fn chunk_entities(entities: &[FusedEntity]) -> Vec<Vec<FusedEntity>> {
    let mut shards: Vec<Vec<FusedEntity>> = Vec::new();
    let mut current: Vec<FusedEntity> = Vec::new();
    let mut current_bytes = 0usize;
    for entity in entities {
        let bytes = serde_json::to_vec(&json!({ "entities": [entity] }))
            .map(|v| v.len())
            .unwrap_or(0);
        let over_count = current.len() >= StorageConfig::MAX_SHARD_ENTITIES;
        let over_bytes =
            !current.is_empty() && current_bytes + bytes > StorageConfig::MAX_SHARD_BYTES;
        if over_count || over_bytes {
            shards.push(std::mem::take(&mut current));
            current_bytes = 0;
        }
        current_bytes += bytes;
        current.push(entity.clone());
    }
    if !current.is_empty() {
        shards.push(current);
    }
    shards
}
