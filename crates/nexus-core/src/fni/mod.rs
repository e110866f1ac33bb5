//! FNI — the composite Popularity/Velocity/Credibility/Utility index.
//!
//! Two stages: [`score::FniEngine`] computes the per-entity base score with
//! a full breakdown and commentary; [`analysis`] applies the batch-level
//! adjustments (anomaly multiplier, time decay, percentile rank).

pub mod analysis;
pub mod score;

pub use analysis::AnomalyFlag;
pub use score::{FniBreakdown, FniEngine, FniScore, ScoreSignals};
