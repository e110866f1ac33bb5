//! # nexus-core
//!
//! Headless core of the AI-Nexus content platform: cross-source entity
//! resolution, knowledge-graph linking, and FNI scoring for AI model,
//! dataset, and agent metadata.
//!
//! The pipeline reconciles inconsistent identifier schemes
//! (`huggingface/org/name`, `replicate:org/name`, `hf-model--org--name`)
//! into canonical IDs, fuses duplicate records per entity, links entities
//! into a directed relation graph, and computes an auditable composite
//! score (Popularity / Velocity / Credibility / Utility) per entity. The
//! output is a set of gzip JSON artifacts under fixed storage keys,
//! consumed by the (external) static-site frontend.
//!
//! No HTTP, no templating, no object-storage client: ingestion and upload
//! are the caller's problem. Every component here is a pure function of an
//! immutable input snapshot.
//!
//! ```
//! use chrono::Utc;
//! use nexus_core::entity::{EntityType, RawRecord};
//! use nexus_core::pipeline::{Pipeline, RunContext};
//!
//! let records = vec![RawRecord {
//!     id: "huggingface/meta-llama/meta-llama-3-8b-instruct".to_string(),
//!     entity_type: Some(EntityType::Model),
//!     source: "huggingface".to_string(),
//!     ..Default::default()
//! }];
//! let output = Pipeline::new().run(&records, &RunContext::new(Utc::now()));
//! assert_eq!(output.entities[0].id, "meta-llama--meta-llama-3-8b-instruct");
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod fni;
pub mod graph;
pub mod identity;
pub mod pipeline;
pub mod storage;

pub use entity::{EntityEnvelope, FusedEntity, RawRecord};
pub use error::{NexusError, Result};
pub use fni::{FniEngine, FniScore};
pub use graph::KnowledgeGraph;
pub use identity::{IdNormalizer, PathCandidates};
pub use pipeline::{Pipeline, RunContext, RunOutput};
