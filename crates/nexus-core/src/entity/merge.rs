//! Entity merge resolution.
//!
//! Two distinct merges live here:
//!
//! * [`EntityEnvelope::merge_into`] — reconciling a stored envelope (the
//!   validated outer wrapper) with the richer nested payload it wraps.
//! * [`FusedEntity::absorb`] — fusing multiple raw source records that
//!   share one CanonicalId into a single entity.
//!
//! The envelope precedence rule is asymmetric and counter-intuitive: any
//! field the envelope sets wins, INCLUDING explicitly empty/zero values,
//! except `html_readme` which is taken from the nested payload. Envelopes
//! are trusted for structure but are known to carry stale readme
//! placeholders, while nested payloads carry the real readme but
//! less-trusted structural fields. Do not simplify this rule without
//! re-verifying against real stored payloads; symmetric "richer field wins"
//! merging reintroduces empty-field regressions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::types::{Architecture, EntityStats, EntityType, FusedEntity, RawRecord, Relation};
use crate::identity::IdNormalizer;

/// Outer storage-envelope shape. Every field is optional so a field the
/// envelope sets explicitly — even to an empty string or zero — is
/// distinguishable from a field it omits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityEnvelope {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub entity_type: Option<EntityType>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub stats: Option<EntityStats>,
    #[serde(default)]
    pub relations: Option<Vec<Relation>>,
    #[serde(default)]
    pub html_readme: Option<String>,
    #[serde(default)]
    pub fni_score: Option<f64>,
    #[serde(default)]
    pub source_trail: Option<Vec<String>>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub arxiv_id: Option<String>,
    #[serde(default)]
    pub architecture: Option<Architecture>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

impl EntityEnvelope {
    /// Overlay this envelope onto its nested payload.
    ///
    /// Starts from `inner` and overwrites with every field this envelope
    /// sets (explicit falsy values win). Exceptions:
    ///
    /// * `html_readme` — kept from `inner` whenever `inner`'s is non-empty;
    ///   the envelope's value is only used when `inner` has none.
    /// * `id` / `type` — taken from the envelope only when present and
    ///   non-empty, else from `inner`.
    pub fn merge_into(&self, inner: &FusedEntity) -> FusedEntity {
        let mut fused = inner.clone();

        if let Some(id) = self.id.as_deref().filter(|s| !s.is_empty()) {
            fused.id = id.to_string();
        }
        if let Some(ty) = self.entity_type {
            fused.entity_type = ty;
        }
        if let Some(name) = &self.name {
            fused.name = name.clone();
        }
        if let Some(description) = &self.description {
            fused.description = description.clone();
        }
        if let Some(tags) = &self.tags {
            fused.tags = tags.clone();
        }
        if let Some(stats) = &self.stats {
            fused.stats = *stats;
        }
        if let Some(relations) = &self.relations {
            fused.relations = relations.clone();
        }
        if inner.html_readme.is_empty() {
            if let Some(html_readme) = &self.html_readme {
                fused.html_readme = html_readme.clone();
            }
        }
        if let Some(fni_score) = self.fni_score {
            fused.fni_score = fni_score;
        }
        if let Some(source_trail) = &self.source_trail {
            fused.source_trail = source_trail.clone();
        }
        if let Some(author) = &self.author {
            fused.author = author.clone();
        }
        if let Some(arxiv_id) = &self.arxiv_id {
            fused.arxiv_id = Some(arxiv_id.clone());
        }
        if let Some(architecture) = &self.architecture {
            fused.architecture = Some(architecture.clone());
        }
        if let Some(created_at) = self.created_at {
            fused.created_at = Some(created_at);
        }
        if let Some(last_modified) = self.last_modified {
            fused.last_modified = Some(last_modified);
        }
        fused
    }
}

impl FusedEntity {
    /// Fold one raw source record into this entity.
    ///
    /// Empty scalar fields are filled from the record; populated ones are
    /// kept (first source to provide a field anchors it). Tags are unioned
    /// in order, relation targets are normalized and appended without
    /// dedup, stats take the field-wise maximum, and the record's source is
    /// appended to the trail.
    pub fn absorb(&mut self, record: &RawRecord, normalizer: &IdNormalizer) {
        if self.name.is_empty() && !record.name.is_empty() {
            self.name = record.name.clone();
        }
        if self.description.is_empty() && !record.description.is_empty() {
            self.description = record.description.clone();
        }
        if self.html_readme.is_empty() && !record.html_readme.is_empty() {
            self.html_readme = record.html_readme.clone();
        }
        if self.author.is_empty() && !record.author.is_empty() {
            self.author = record.author.clone();
        }
        if self.arxiv_id.is_none() {
            self.arxiv_id = record.arxiv_id.clone();
        }
        if self.architecture.is_none() {
            self.architecture = record.architecture.clone();
        }
        if self.created_at.is_none() {
            self.created_at = record.created_at;
        }
        if self.last_modified.is_none() {
            self.last_modified = record.last_modified;
        }

        for tag in &record.tags {
            if !self.tags.contains(tag) {
                self.tags.push(tag.clone());
            }
        }
        for relation in &record.relations {
            let target = normalizer.normalize(&relation.target);
            if target.is_empty() {
                continue;
            }
            self.relations.push(Relation { target, kind: relation.kind });
        }
        self.stats = self.stats.max_with(&record.stats);
        if !record.source.is_empty() {
            self.source_trail.push(record.source.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::types::RelationKind;

    fn inner_entity() -> FusedEntity {
        let mut e = FusedEntity::new("meta-llama--llama-2-7b", EntityType::Model);
        e.description = "Full text".to_string();
        e.html_readme = "<p>readme</p>".to_string();
        e.fni_score = 95.0;
        e
    }

    #[test]
    fn test_outer_explicit_falsy_values_win() {
        let outer = EntityEnvelope {
            description: Some(String::new()),
            fni_score: Some(0.0),
            ..Default::default()
        };
        let fused = outer.merge_into(&inner_entity());
        assert_eq!(fused.description, "");
        assert_eq!(fused.fni_score, 0.0);
    }

    #[test]
    fn test_omitted_outer_fields_keep_inner() {
        let fused = EntityEnvelope::default().merge_into(&inner_entity());
        assert_eq!(fused.description, "Full text");
        assert_eq!(fused.fni_score, 95.0);
    }

    #[test]
    fn test_html_readme_never_lost() {
        // Non-empty inner readme survives any outer value, stale
        // placeholder or otherwise.
        for outer_readme in [None, Some(String::new()), Some("stale".to_string())] {
            let outer = EntityEnvelope { html_readme: outer_readme, ..Default::default() };
            let fused = outer.merge_into(&inner_entity());
            assert_eq!(fused.html_readme, "<p>readme</p>");
        }
        // Envelope readme only applies when inner has none.
        let mut empty_inner = inner_entity();
        empty_inner.html_readme.clear();
        let outer = EntityEnvelope {
            html_readme: Some("envelope readme".to_string()),
            ..Default::default()
        };
        assert_eq!(outer.merge_into(&empty_inner).html_readme, "envelope readme");
    }

    #[test]
    fn test_id_and_type_fallback() {
        let inner = inner_entity();
        let outer = EntityEnvelope { id: Some(String::new()), ..Default::default() };
        assert_eq!(outer.merge_into(&inner).id, "meta-llama--llama-2-7b");

        let outer = EntityEnvelope {
            id: Some("other--id".to_string()),
            entity_type: Some(EntityType::Agent),
            ..Default::default()
        };
        let fused = outer.merge_into(&inner);
        assert_eq!(fused.id, "other--id");
        assert_eq!(fused.entity_type, EntityType::Agent);
    }

    #[test]
    fn test_absorb_fills_unions_and_maxes() {
        let normalizer = IdNormalizer::default();
        let mut fused = FusedEntity::new("org--name", EntityType::Model);

        let first = RawRecord {
            id: "huggingface/org/name".to_string(),
            name: "Name".to_string(),
            tags: vec!["gguf".to_string()],
            stats: EntityStats { likes: 10, downloads: 100, ..Default::default() },
            relations: vec![Relation {
                target: "hf-model--base--model".to_string(),
                kind: RelationKind::FineTuneOf,
            }],
            source: "huggingface".to_string(),
            ..Default::default()
        };
        let second = RawRecord {
            id: "replicate:org/name".to_string(),
            name: "Other Name".to_string(),
            description: "desc".to_string(),
            tags: vec!["gguf".to_string(), "llama".to_string()],
            stats: EntityStats { likes: 4, downloads: 500, ..Default::default() },
            source: "replicate".to_string(),
            ..Default::default()
        };
        fused.absorb(&first, &normalizer);
        fused.absorb(&second, &normalizer);

        assert_eq!(fused.name, "Name");
        assert_eq!(fused.description, "desc");
        assert_eq!(fused.tags, vec!["gguf", "llama"]);
        assert_eq!(fused.stats.likes, 10);
        assert_eq!(fused.stats.downloads, 500);
        assert_eq!(fused.relations.len(), 1);
        assert_eq!(fused.relations[0].target, "base--model");
        assert_eq!(fused.source_trail, vec!["huggingface", "replicate"]);
    }
}
