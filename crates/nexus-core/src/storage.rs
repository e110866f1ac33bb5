//! Artifact encoding and staging.
//!
//! The core performs no remote I/O; it produces gzip-compressed JSON
//! artifacts under bit-exact storage keys and stages them to a local
//! directory for the external uploader. Decoding sniffs the gzip magic
//! bytes — historical artifacts were sometimes stored as plain JSON — and
//! treats unparseable payloads as fatal: a corrupt record must never
//! masquerade as a valid low-score entity.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::config::StorageConfig;
use crate::entity::FusedEntity;
use crate::error::{NexusError, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Storage key for one fused entity artifact.
pub fn fused_key(canonical_id: &str) -> String {
    format!("{}/{}.json.gz", StorageConfig::FUSED_PREFIX, canonical_id)
}

/// Storage key for the n-th fused shard.
pub fn shard_key(index: usize) -> String {
    format!("{}/part-{}.json.gz", StorageConfig::FUSED_PREFIX, index)
}

/// Storage key for the knowledge-graph edges artifact.
pub fn graph_key() -> &'static str {
    StorageConfig::GRAPH_KEY
}

/// Serialize a value to gzip-compressed JSON.
pub fn encode_artifact<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(value)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    Ok(encoder.finish()?)
}

/// Encode one shard of fused entities as the `{ "entities": [...] }`
/// payload external readers expect.
pub fn encode_shard(entities: &[FusedEntity]) -> Result<Vec<u8>> {
    encode_artifact(&json!({ "entities": entities }))
}

/// Decode a stored artifact, sniffing for gzip and falling back to plain
/// JSON.
///
/// Any undecodable payload is a fatal [`NexusError::CorruptArtifact`] for
/// `key`; defaults are never substituted.
pub fn decode_artifact<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T> {
    let json = if bytes.starts_with(&GZIP_MAGIC) {
        let mut decoder = GzDecoder::new(bytes);
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .map_err(|err| NexusError::CorruptArtifact {
                key: key.to_string(),
                message: format!("gzip stream unreadable: {err}"),
                source: None,
            })?;
        decompressed
    } else {
        bytes.to_vec()
    };
    serde_json::from_slice(&json).map_err(|err| NexusError::corrupt(key, err))
}

/// Stage an encoded artifact into `staging_dir` under its storage key.
///
/// Writes to a temp sibling and renames, so the uploader never observes a
/// half-written artifact. Returns the staged path.
pub fn stage_artifact(staging_dir: &Path, key: &str, bytes: &[u8]) -> Result<PathBuf> {
    let path = staging_dir.join(key);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| NexusError::io_with_path(err, parent))?;
    }
    let tmp = path.with_extension("gz.tmp");
    fs::write(&tmp, bytes).map_err(|err| NexusError::io_with_path(err, &tmp))?;
    fs::rename(&tmp, &path).map_err(|err| NexusError::io_with_path(err, &path))?;
    debug!(key, bytes = bytes.len(), "staged artifact");
    Ok(path)
}
