//! Centralized configuration for the AI-Nexus core.
//!
//! All tables and tuning constants live here as immutable data. Components
//! take their configuration at construction time and never mutate it.

/// FNI composite weights and normalization anchors.
///
/// FNI = P(25%) + V(25%) + C(30%) + U(20%), each sub-score on a 0-100 scale.
pub struct ScoringConfig;

impl ScoringConfig {
    pub const WEIGHT_P: f64 = 0.25;
    pub const WEIGHT_V: f64 = 0.25;
    pub const WEIGHT_C: f64 = 0.30;
    pub const WEIGHT_U: f64 = 0.20;

    /// Log10 anchor for the HuggingFace economy: 1M weighted downloads
    /// lands around 86/100.
    pub const HF_LOG_ANCHOR: f64 = 7.0;
    /// Log10 anchor for the GitHub economy: 30k stars lands around 89/100.
    pub const GH_LOG_ANCHOR: f64 = 5.0;
    /// One like is worth roughly 20 downloads for models and agents.
    pub const LIKE_WEIGHT: f64 = 20.0;
    /// Spaces have no downloads; likes are the only currency.
    pub const SPACE_LIKE_WEIGHT: f64 = 100.0;
    /// Datasets have high bulk downloads and need de-weighting.
    pub const DATASET_DOWNLOAD_WEIGHT: f64 = 0.5;
    /// Forks represent deeper engagement and weigh double.
    pub const FORK_WEIGHT: f64 = 2.0;

    /// Velocity normalization: a 7-day gain of this many weighted
    /// interactions maps to 100.
    pub const MAX_VELOCITY: f64 = 1_000.0;
    /// Sub-score used when no historical snapshot exists. A missing history
    /// is a zero-information state, not a signal of stagnation.
    pub const NEUTRAL_VELOCITY: f64 = 50.0;
    /// Entities younger than this many days use the cold-start delta
    /// approximation instead of the snapshot comparison.
    pub const COLD_START_DAYS: f64 = 7.0;

    // Credibility points
    pub const ARXIV_POINTS: f64 = 20.0;
    pub const PAPER_RELATION_POINTS: f64 = 20.0;
    pub const README_TIER_POINTS: f64 = 10.0;
    pub const README_TIERS: [usize; 3] = [500, 2_000, 10_000];
    pub const KNOWN_ORG_POINTS: f64 = 30.0;
    pub const ORG_HEURISTIC_POINTS: f64 = 15.0;

    // Utility points ("runtime first": can you run it locally?)
    pub const OLLAMA_POINTS: f64 = 30.0;
    pub const GGUF_POINTS: f64 = 25.0;
    pub const COMPLETE_README_POINTS: f64 = 15.0;
    pub const COMPLETE_README_CHARS: usize = 5_000;
    pub const PARTIAL_README_CHARS: usize = 2_000;
    pub const DOCKER_POINTS: f64 = 10.0;
    pub const INFERENCE_API_POINTS: f64 = 10.0;

    /// Authors whose presence alone is a strong credibility signal.
    pub const KNOWN_ORGS: &'static [&'static str] = &[
        "meta-llama",
        "google",
        "openai",
        "microsoft",
        "mistralai",
        "anthropic",
        "stabilityai",
        "nvidia",
        "qwen",
        "deepseek-ai",
        "alibaba",
        "huggingface",
        "bigscience",
        "eleutherai",
        "cohere",
    ];
}

/// Anomaly detection thresholds (anti-manipulation).
pub struct AnomalyConfig;

impl AnomalyConfig {
    /// Plausible bounds for the downloads-per-like ratio.
    pub const MIN_DOWNLOAD_RATIO: f64 = 0.1;
    pub const MAX_DOWNLOAD_RATIO: f64 = 100_000.0;
    /// Likes above this with an essentially empty readme flag a mismatch.
    pub const HIGH_LIKES: u64 = 10_000;
    pub const MIN_CONTENT_FOR_HIGH_LIKES: usize = 200;
    /// Velocity beyond this multiple of the batch average flags growth.
    pub const GROWTH_MULTIPLIER: f64 = 10.0;
    /// Penalties never push the multiplier below this floor.
    pub const MULTIPLIER_FLOOR: f64 = 0.5;
}

/// Time decay applied to the composite score for inactive projects.
pub struct DecayConfig;

impl DecayConfig {
    /// No decay within the grace period.
    pub const GRACE_DAYS: f64 = 30.0;
    /// Linear decay per day after the grace period.
    pub const DECAY_PER_DAY: f64 = 0.001;
    /// Decay never reduces a score below this fraction.
    pub const DECAY_FLOOR: f64 = 0.6;
    /// Penalty when no activity date is known at all.
    pub const ZOMBIE_PENALTY: f64 = 0.5;
}

/// Storage key templates and persistence ceilings.
///
/// External readers hardcode these key templates; they are a bit-exact
/// contract.
pub struct StorageConfig;

impl StorageConfig {
    /// Key prefix for fused entity artifacts.
    pub const FUSED_PREFIX: &'static str = "cache/fused";
    /// Key for the knowledge-graph edges artifact.
    pub const GRAPH_KEY: &'static str = "cache/mesh/graph.json.gz";
    /// Maximum entities per persisted shard.
    pub const MAX_SHARD_ENTITIES: usize = 5_000;
    /// Maximum serialized (uncompressed) bytes per persisted shard.
    pub const MAX_SHARD_BYTES: usize = 24 * 1024 * 1024;
}
