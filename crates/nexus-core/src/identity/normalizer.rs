//! Identifier normalization.
//!
//! Two directions of travel:
//!
//! * [`IdNormalizer::normalize`] collapses any raw identifier down to the
//!   bare `org--name` slug used as the merge key — prefixes stripped,
//!   separators unified.
//! * [`IdNormalizer::canonical_id`] goes the other way: given a raw
//!   identifier plus source/type context it produces the prefixed
//!   `{type-prefix}--{slug}` form that storage keys are built from.
//!
//! Historical note on stripping: legacy identifiers nest prefixes
//! (`kb:report:arxiv:...`, `hf-model--huggingface/...`), so a single strip
//! pass is not enough, while an unbounded loop would eat identifiers whose
//! *content* happens to start with a prefix word. Stripping is therefore a
//! bounded loop, default depth 2. Identifiers nested deeper than that keep
//! their residual prefix; re-normalizing such an identifier strips one more
//! level, so idempotence holds only up to the configured depth.
//!
//! Namespaces from different sources do NOT converge: the HuggingFace org
//! for the Llama models is `meta-llama` while Replicate's is `meta`, so
//! `huggingface/meta-llama/meta-llama-3-8b-instruct` and
//! `replicate:meta/meta-llama-3-8b-instruct` normalize to different slugs.
//! That is a property of the upstream namespaces, not of this code.

use std::sync::LazyLock;

use regex::Regex;

use crate::entity::EntityType;

/// Leading source/type prefix followed by at least one separator.
///
/// Alternatives are ordered longest-first so `hf-model--x` strips as
/// `hf-model` + `--`, not `hf` + `-`.
static PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        "^(?:huggingface_deepspec|huggingface|hf-dataset|replicate|knowledge\
         |hf-model|hf-agent|hf-space|concept|dataset|hf-tool|github|report\
         |arxiv|paper|model|agent|space|tool|kb|hf)[:/-]+",
    )
    .expect("prefix regex is valid")
});

/// Legacy source prefixes that appear *before* the canonical type prefix in
/// very old identifiers. At most one is stripped.
const LEGACY_PREFIXES: &[&str] = &[
    "huggingface--",
    "github--",
    "arxiv--",
    "paper--",
    "civitai--",
    "kaggle--",
];

/// Canonical `{source}-{type}` prefixes. An identifier already carrying one
/// of these is returned by `canonical_id` unchanged.
const CANONICAL_PREFIXES: &[&str] = &[
    "hf-model--",
    "hf-dataset--",
    "hf-space--",
    "hf-agent--",
    "hf-tool--",
    "gh-model--",
    "gh-agent--",
    "gh-tool--",
    "arxiv-paper--",
    "civitai-model--",
    "kaggle-dataset--",
];

/// Identifier normalizer with a bounded prefix-strip depth.
#[derive(Debug, Clone)]
pub struct IdNormalizer {
    max_strip_depth: usize,
}

impl Default for IdNormalizer {
    fn default() -> Self {
        Self::new(2)
    }
}

impl IdNormalizer {
    /// Create a normalizer stripping at most `max_strip_depth` nested
    /// prefixes. Production callers use [`IdNormalizer::default`] (depth 2).
    pub fn new(max_strip_depth: usize) -> Self {
        Self { max_strip_depth }
    }

    /// Normalize a raw identifier to the bare `org--name` merge slug.
    ///
    /// Lowercases and trims, strips up to `max_strip_depth` nested
    /// source/type prefixes, then maps the remaining `:` and `/`
    /// separators to `--`. Empty input normalizes to an empty string.
    ///
    /// ```
    /// use nexus_core::identity::IdNormalizer;
    ///
    /// let n = IdNormalizer::default();
    /// assert_eq!(
    ///     n.normalize("huggingface/meta-llama/meta-llama-3-8b-instruct"),
    ///     "meta-llama--meta-llama-3-8b-instruct"
    /// );
    /// assert_eq!(
    ///     n.normalize("hf-model--meta-llama--meta-llama-3-8b-instruct"),
    ///     "meta-llama--meta-llama-3-8b-instruct"
    /// );
    /// ```
    pub fn normalize(&self, raw: &str) -> String {
        let mut id = raw.trim().to_lowercase();
        if id.is_empty() {
            return id;
        }
        for _ in 0..self.max_strip_depth {
            let stripped = PREFIX_RE.replace(&id, "");
            if stripped == id {
                break;
            }
            id = stripped.into_owned();
        }
        id.replace([':', '/'], "--")
    }

    /// Build the canonical prefixed identifier used in storage keys.
    ///
    /// Cleans the raw identifier (trims, lowercases, drops a trailing
    /// `.json`, unifies separators, strips one legacy source prefix), then
    /// prepends the `{source}-{type}` prefix for the given context. An
    /// identifier already carrying a canonical prefix passes through
    /// unchanged, which makes the operation idempotent.
    ///
    /// Missing context is inferred conservatively: a slug that looks like a
    /// repo path defaults to the HuggingFace source, the arXiv source
    /// implies the paper type, and the HuggingFace/Civitai sources imply
    /// the model type. When no prefix can be determined the bare cleaned
    /// slug is returned.
    pub fn canonical_id(&self, raw: &str, source: Option<&str>, ty: Option<EntityType>) -> String {
        let mut id = raw.trim().to_lowercase();
        if id.is_empty() {
            return id;
        }
        if let Some(base) = id.strip_suffix(".json") {
            id = base.to_string();
        }
        let mut id = id.replace([':', '/'], "--");

        for legacy in LEGACY_PREFIXES {
            if let Some(rest) = id.strip_prefix(legacy) {
                id = rest.to_string();
                break;
            }
        }

        if CANONICAL_PREFIXES.iter().any(|p| id.starts_with(p)) {
            return id;
        }

        let source = match source.map(str::trim).filter(|s| !s.is_empty()) {
            Some("huggingface") => Some("hf"),
            Some("github") => Some("gh"),
            Some(s) => Some(s),
            // A bare repo path almost always came from the HuggingFace
            // crawl; everything else stays unprefixed.
            None if id.contains("--") || raw.contains('/') => Some("hf"),
            None => None,
        };
        let ty = ty.or(match source {
            Some("arxiv") => Some(EntityType::Paper),
            Some("hf") | Some("civitai") => Some(EntityType::Model),
            _ => None,
        });

        match (source, ty) {
            (Some("hf"), Some(EntityType::Model)) => format!("hf-model--{id}"),
            (Some("hf"), Some(EntityType::Dataset)) => format!("hf-dataset--{id}"),
            (Some("hf"), Some(EntityType::Space)) => format!("hf-space--{id}"),
            (Some("hf"), Some(EntityType::Agent)) => format!("hf-agent--{id}"),
            (Some("hf"), Some(EntityType::Tool)) => format!("hf-tool--{id}"),
            (Some("gh"), Some(EntityType::Model)) => format!("gh-model--{id}"),
            (Some("gh"), Some(EntityType::Agent)) => format!("gh-agent--{id}"),
            (Some("gh"), Some(EntityType::Tool)) => format!("gh-tool--{id}"),
            (Some("arxiv"), Some(EntityType::Paper)) => format!("arxiv-paper--{id}"),
            (Some("civitai"), Some(EntityType::Model)) => format!("civitai-model--{id}"),
            (Some("kaggle"), Some(EntityType::Dataset)) => format!("kaggle-dataset--{id}"),
            _ => id,
        }
    }
}
