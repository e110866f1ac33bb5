//! Identifier normalization and storage-path candidate generation.
//!
//! Raw entity identifiers arrive in every convention the upstream sources
//! ever used: `huggingface/org/name`, `replicate:org/name`,
//! `hf-model--org--name`, bare `org/name`, and several legacy hybrids. This
//! module canonicalizes them and enumerates the storage keys an artifact may
//! live under.

pub mod candidates;
pub mod normalizer;

pub use candidates::PathCandidates;
pub use normalizer::IdNormalizer;
