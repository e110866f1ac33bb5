//! Knowledge-graph construction and lookup.
//!
//! Edges are derived entirely from `FusedEntity.relations` and rebuilt
//! alongside the fused set each run. Adjacency maps a CanonicalId to its
//! outgoing edges in insertion order; identical duplicate edges are kept
//! (dedup is a presentation concern).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entity::{FusedEntity, RelationKind};
use crate::identity::IdNormalizer;

/// Directed edge to a normalized target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub target: String,
    #[serde(rename = "type")]
    pub kind: RelationKind,
}

/// Adjacency model over CanonicalIds.
///
/// `BTreeMap` keeps serialization deterministic across runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    pub edges: BTreeMap<String, Vec<Edge>>,
}

impl KnowledgeGraph {
    /// Build the graph from a fused entity set.
    ///
    /// Every entity gets an adjacency entry, including relation-less ones,
    /// so exact lookup distinguishes "no edges" from "unknown id". Targets
    /// are re-normalized; relation targets that normalize to empty are
    /// dropped.
    pub fn build(entities: &[FusedEntity], normalizer: &IdNormalizer) -> Self {
        let mut edges: BTreeMap<String, Vec<Edge>> = BTreeMap::new();
        let mut edge_count = 0usize;
        for entity in entities {
            let outgoing = edges.entry(entity.id.clone()).or_default();
            for relation in &entity.relations {
                let target = normalizer.normalize(&relation.target);
                if target.is_empty() {
                    continue;
                }
                outgoing.push(Edge { target, kind: relation.kind });
                edge_count += 1;
            }
        }
        debug!(entities = entities.len(), edges = edge_count, "built knowledge graph");
        KnowledgeGraph { edges }
    }

    /// Authoritative exact lookup of an entity's outgoing edges.
    pub fn outgoing(&self, id: &str) -> &[Edge] {
        self.edges.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Diagnostic substring lookup: every `(source, edge)` pair whose
    /// target contains `fragment`, case-insensitively.
    ///
    /// Best-effort repair/debugging aid only — substrings collide across
    /// unrelated entities, so this must never stand in for [`outgoing`]
    /// in production resolution.
    ///
    /// [`outgoing`]: KnowledgeGraph::outgoing
    pub fn find_stripped(&self, fragment: &str) -> Vec<(&str, &Edge)> {
        let fragment = fragment.to_lowercase();
        if fragment.is_empty() {
            return Vec::new();
        }
        let mut hits = Vec::new();
        for (source, outgoing) in &self.edges {
            for edge in outgoing {
                if edge.target.to_lowercase().contains(&fragment) {
                    hits.push((source.as_str(), edge));
                }
            }
        }
        hits
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityType, Relation};

    fn entity(id: &str, relations: Vec<Relation>) -> FusedEntity {
        let mut e = FusedEntity::new(id, EntityType::Model);
        e.relations = relations;
        e
    }

    #[test]
    fn test_no_reverse_edge_auto_created() {
        let normalizer = IdNormalizer::default();
        let entities = vec![
            entity(
                "a--one",
                vec![Relation { target: "b--two".to_string(), kind: RelationKind::DerivedFrom }],
            ),
            entity("b--two", vec![]),
        ];
        let graph = KnowledgeGraph::build(&entities, &normalizer);
        assert_eq!(
            graph.outgoing("a--one"),
            &[Edge { target: "b--two".to_string(), kind: RelationKind::DerivedFrom }]
        );
        assert!(graph.outgoing("b--two").is_empty());
        // Unknown id is indistinguishable only in emptiness, not presence.
        assert!(!graph.edges.contains_key("c--three"));
        assert!(graph.outgoing("c--three").is_empty());
    }

    #[test]
    fn test_targets_normalized_and_duplicates_kept() {
        let normalizer = IdNormalizer::default();
        let rel = |target: &str| Relation { target: target.to_string(), kind: RelationKind::Cites };
        let entities = vec![entity(
            "a--one",
            vec![rel("arxiv:2310.06825"), rel("arxiv--2310.06825"), rel("")],
        )];
        let graph = KnowledgeGraph::build(&entities, &normalizer);
        let outgoing = graph.outgoing("a--one");
        assert_eq!(outgoing.len(), 2);
        assert_eq!(outgoing[0].target, "2310.06825");
        assert_eq!(outgoing[0], outgoing[1]);
    }

    #[test]
    fn test_stripped_lookup_is_substring_based() {
        let normalizer = IdNormalizer::default();
        let entities = vec![entity(
            "a--one",
            vec![Relation {
                target: "meta-llama--meta-llama-3-8b-instruct".to_string(),
                kind: RelationKind::SimilarTo,
            }],
        )];
        let graph = KnowledgeGraph::build(&entities, &normalizer);
        let hits = graph.find_stripped("LLAMA-3");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, "a--one");
        assert!(graph.find_stripped("mistral").is_empty());
        assert!(graph.find_stripped("").is_empty());
    }
}
