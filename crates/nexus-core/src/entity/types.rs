//! Entity data model.
//!
//! `RawRecord` is the immutable per-source input shape; `FusedEntity` is the
//! merged canonical representation persisted per CanonicalId. One fused
//! entity is fully recomputed per pipeline run, never patched across runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fni::FniScore;

/// Entity type. Drives prefix variants and path templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Model,
    Agent,
    Dataset,
    Space,
    Tool,
    Paper,
    Knowledge,
}

impl EntityType {
    /// Parse a user-facing type name, accepting plurals.
    ///
    /// Unlisted plurals fall back to stripping one trailing `s`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        let singular = match s.as_str() {
            "model" | "models" => return Some(Self::Model),
            "agent" | "agents" => return Some(Self::Agent),
            "dataset" | "datasets" => return Some(Self::Dataset),
            "space" | "spaces" => return Some(Self::Space),
            "tool" | "tools" => return Some(Self::Tool),
            "paper" | "papers" => return Some(Self::Paper),
            "knowledge" => return Some(Self::Knowledge),
            other => other.strip_suffix('s')?,
        };
        match singular {
            "model" => Some(Self::Model),
            "agent" => Some(Self::Agent),
            "dataset" => Some(Self::Dataset),
            "space" => Some(Self::Space),
            "tool" => Some(Self::Tool),
            "paper" => Some(Self::Paper),
            "knowledge" => Some(Self::Knowledge),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Agent => "agent",
            Self::Dataset => "dataset",
            Self::Space => "space",
            Self::Tool => "tool",
            Self::Paper => "paper",
            Self::Knowledge => "knowledge",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship kind between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    #[serde(rename = "DERIVED_FROM")]
    DerivedFrom,
    #[serde(rename = "FINE_TUNE_OF")]
    FineTuneOf,
    #[serde(rename = "QUANTIZATION_OF")]
    QuantizationOf,
    #[serde(rename = "CITES")]
    Cites,
    #[serde(rename = "SIMILAR_TO")]
    SimilarTo,
    #[serde(rename = "EXPLAINS")]
    Explains,
    #[serde(rename = "FEATURED_IN")]
    FeaturedIn,
    #[serde(rename = "RELATED")]
    Related,
}

/// Directed reference from the owning entity to `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub target: String,
    #[serde(rename = "type")]
    pub kind: RelationKind,
}

/// Raw engagement counters from whichever source reported them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntityStats {
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub stars: u64,
    #[serde(default)]
    pub forks: u64,
}

impl EntityStats {
    /// Field-wise maximum. Sources report overlapping counters at
    /// different crawl times; the highest observation wins.
    pub fn max_with(&self, other: &EntityStats) -> EntityStats {
        EntityStats {
            likes: self.likes.max(other.likes),
            downloads: self.downloads.max(other.downloads),
            stars: self.stars.max(other.stars),
            forks: self.forks.max(other.forks),
        }
    }
}

/// Model architecture, as reported upstream.
///
/// HuggingFace payloads carry either a bare string (`"llama"`) or an object
/// with a `name` field. Both wire shapes deserialize here; [`Architecture::name`]
/// is the single discrimination point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Architecture {
    RawName(String),
    Described { name: String },
}

impl Architecture {
    pub fn name(&self) -> &str {
        match self {
            Self::RawName(name) => name,
            Self::Described { name } => name,
        }
    }
}

/// One partial entity representation as fetched from a single source or
/// pipeline stage. Immutable input; several may describe the same
/// CanonicalId.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecord {
    /// Source-native, un-normalized identifier.
    pub id: String,
    #[serde(rename = "type", default)]
    pub entity_type: Option<EntityType>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub stats: EntityStats,
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(default)]
    pub html_readme: String,
    /// Upstream system that produced this record.
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub arxiv_id: Option<String>,
    #[serde(default)]
    pub architecture: Option<Architecture>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

/// The merged canonical representation of one entity. Relation targets are
/// already normalized to CanonicalIds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusedEntity {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub stats: EntityStats,
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(default)]
    pub html_readme: String,
    #[serde(default)]
    pub fni_score: f64,
    /// Full score breakdown and commentary backing `fni_score`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fni: Option<FniScore>,
    /// Every source that contributed a record, in contribution order.
    #[serde(default)]
    pub source_trail: Vec<String>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub arxiv_id: Option<String>,
    #[serde(default)]
    pub architecture: Option<Architecture>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

impl FusedEntity {
    /// Empty fused entity anchored at a CanonicalId.
    pub fn new(id: impl Into<String>, entity_type: EntityType) -> Self {
        FusedEntity {
            id: id.into(),
            entity_type,
            name: String::new(),
            description: String::new(),
            tags: Vec::new(),
            stats: EntityStats::default(),
            relations: Vec::new(),
            html_readme: String::new(),
            fni_score: 0.0,
            fni: None,
            source_trail: Vec::new(),
            author: String::new(),
            arxiv_id: None,
            architecture: None,
            created_at: None,
            last_modified: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_parse_plurals() {
        assert_eq!(EntityType::parse("models"), Some(EntityType::Model));
        assert_eq!(EntityType::parse("Datasets"), Some(EntityType::Dataset));
        assert_eq!(EntityType::parse("knowledge"), Some(EntityType::Knowledge));
        // The trailing-s fallback covers every type, knowledge included.
        assert_eq!(EntityType::parse("knowledges"), Some(EntityType::Knowledge));
        assert_eq!(EntityType::parse("gizmos"), None);
        assert_eq!(EntityType::parse(""), None);
    }

    #[test]
    fn test_architecture_wire_shapes() {
        let raw: Architecture = serde_json::from_str("\"llama\"").unwrap();
        assert_eq!(raw.name(), "llama");
        let described: Architecture = serde_json::from_str(r#"{"name":"llama"}"#).unwrap();
        assert_eq!(described.name(), "llama");
    }

    #[test]
    fn test_stats_max_with() {
        let a = EntityStats { likes: 10, downloads: 5, stars: 0, forks: 1 };
        let b = EntityStats { likes: 3, downloads: 9, stars: 2, forks: 0 };
        assert_eq!(
            a.max_with(&b),
            EntityStats { likes: 10, downloads: 9, stars: 2, forks: 1 }
        );
    }

    #[test]
    fn test_relation_kind_wire_form() {
        let json = serde_json::to_string(&RelationKind::FineTuneOf).unwrap();
        assert_eq!(json, "\"FINE_TUNE_OF\"");
    }
}
