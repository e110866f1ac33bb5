//! Error types for the AI-Nexus core.
//!
//! The resolution/scoring pipeline is deliberately hard to fail: malformed
//! identifiers normalize to empty strings, missing scoring signals degrade to
//! documented defaults, and merge always produces a well-formed entity. The
//! errors below cover the cases that MUST abort an entity's processing —
//! chiefly corrupt stored artifacts, which must never masquerade as valid
//! low-score entities.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for nexus-core operations.
#[derive(Debug, Error)]
pub enum NexusError {
    // Artifact/storage errors
    #[error("Corrupt artifact at {key}: {message}")]
    CorruptArtifact {
        key: String,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Validation errors
    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for nexus-core operations.
pub type Result<T> = std::result::Result<T, NexusError>;

impl From<std::io::Error> for NexusError {
    fn from(err: std::io::Error) -> Self {
        NexusError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for NexusError {
    fn from(err: serde_json::Error) -> Self {
        NexusError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl NexusError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        NexusError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Create a corrupt-artifact error for a storage key.
    pub fn corrupt(key: impl Into<String>, err: serde_json::Error) -> Self {
        NexusError::CorruptArtifact {
            key: key.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// True if this error marks a corrupt stored artifact.
    ///
    /// Corrupt artifacts abort that entity's processing; they are never
    /// substituted with defaults.
    pub fn is_corrupt_artifact(&self) -> bool {
        matches!(self, NexusError::CorruptArtifact { .. })
    }
}
