//! Storage-path candidate generation.
//!
//! Fused artifacts were written under several naming conventions over the
//! project's history (`hf-model--…`, bare `huggingface--…`, source-only
//! `replicate--…`). Rather than migrate the store, lookups probe an ordered
//! list of candidate keys and take the first that resolves. This module
//! produces that list; the probing itself belongs to the storage layer.

use crate::config::StorageConfig;
use crate::entity::EntityType;

/// Ordered source-prefix variants per entity type. Order is the probe
/// order: the modern `{source}-{type}--` forms first, then the legacy
/// source-only and bare forms.
const MODEL_PREFIXES: &[&str] = &[
    "hf-model--",
    "gh-model--",
    "huggingface--",
    "github--",
    "civitai--",
    "ollama--",
    "replicate--",
    "kaggle--",
    "hf--",
    "gh--",
];
const AGENT_PREFIXES: &[&str] = &[
    "gh-agent--",
    "hf-agent--",
    "github--",
    "huggingface--",
    "agent--",
];
const DATASET_PREFIXES: &[&str] = &[
    "hf-dataset--",
    "kaggle-dataset--",
    "dataset--",
    "huggingface--",
    "kaggle--",
    "hf--",
];
const SPACE_PREFIXES: &[&str] = &["hf-space--", "space--", "huggingface--", "hf--"];
const TOOL_PREFIXES: &[&str] = &["gh-tool--", "hf-tool--", "github--", "tool--"];
const PAPER_PREFIXES: &[&str] = &["arxiv-paper--", "arxiv--", "paper--"];

/// Candidate storage-key generator.
///
/// Holds nothing mutable; the prefix tables are compiled in and the struct
/// exists so callers construct it once alongside the other components.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathCandidates;

impl PathCandidates {
    pub fn new() -> Self {
        Self
    }

    /// Prefix variants for a resolved entity type. Knowledge entries have
    /// no registered convention.
    fn prefixes(ty: EntityType) -> &'static [&'static str] {
        match ty {
            EntityType::Model => MODEL_PREFIXES,
            EntityType::Agent => AGENT_PREFIXES,
            EntityType::Dataset => DATASET_PREFIXES,
            EntityType::Space => SPACE_PREFIXES,
            EntityType::Tool => TOOL_PREFIXES,
            EntityType::Paper => PAPER_PREFIXES,
            EntityType::Knowledge => &[],
        }
    }

    /// Enumerate storage keys to probe for `(type, slug)`, deduplicated,
    /// first-occurrence order preserved.
    ///
    /// `ty` accepts the user-facing form, including plurals (`"models"`,
    /// `"datasets"`). An unrecognized type, or a type with no registered
    /// prefix convention, yields an empty list — a normal outcome telling
    /// the caller to try the raw slug directly.
    pub fn candidate_paths(&self, ty: &str, slug: &str) -> Vec<String> {
        let slug = slug.trim().to_lowercase();
        if slug.is_empty() {
            return Vec::new();
        }
        let Some(ty) = EntityType::parse(ty) else {
            return Vec::new();
        };

        let mut keys: Vec<String> = Vec::new();
        for prefix in Self::prefixes(ty) {
            let prefixed = if slug.starts_with(prefix) {
                slug.clone()
            } else {
                format!("{prefix}{slug}")
            };
            let key = format!("{}/{}.json.gz", StorageConfig::FUSED_PREFIX, prefixed);
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_candidates_deterministic_order() {
        let gen = PathCandidates::new();
        let keys = gen.candidate_paths("agent", "microsoft--autogen");
        assert_eq!(
            keys,
            vec![
                "cache/fused/gh-agent--microsoft--autogen.json.gz",
                "cache/fused/hf-agent--microsoft--autogen.json.gz",
                "cache/fused/github--microsoft--autogen.json.gz",
                "cache/fused/huggingface--microsoft--autogen.json.gz",
                "cache/fused/agent--microsoft--autogen.json.gz",
            ]
        );
    }

    #[test]
    fn test_plural_type_aliases() {
        let gen = PathCandidates::new();
        assert_eq!(
            gen.candidate_paths("models", "org--name"),
            gen.candidate_paths("model", "org--name")
        );
        // Unlisted plural falls back to stripping the trailing `s`.
        assert_eq!(
            gen.candidate_paths("papers", "2310.06825"),
            gen.candidate_paths("paper", "2310.06825")
        );
    }

    #[test]
    fn test_already_prefixed_slug_used_unmodified() {
        let gen = PathCandidates::new();
        let keys = gen.candidate_paths("model", "hf-model--org--name");
        assert_eq!(keys[0], "cache/fused/hf-model--org--name.json.gz");
    }

    #[test]
    fn test_unknown_or_unconventioned_type_yields_empty() {
        let gen = PathCandidates::new();
        assert!(gen.candidate_paths("knowledge", "transformers").is_empty());
        assert!(gen.candidate_paths("gizmo", "x").is_empty());
        assert!(gen.candidate_paths("model", "  ").is_empty());
    }
}
