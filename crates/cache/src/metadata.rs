//! Persisted cache metadata records and their binary envelope.
//!
//! Two record kinds exist on disk: the write-once root
//! [`CacheMetadata`] and one [`ShardMetadata`] per output shard. Both
//! use the same envelope: 4-byte magic, little-endian version, little
//! endian payload length, JSON payload. The shard record's presence at
//! its deterministic path is the sole resumability marker for that
//! shard's job.

use std::fs;
use std::path::Path;

use grove_common::{GroveError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const METADATA_MAGIC: &[u8; 4] = b"GDCM";
const SHARD_MAGIC: &[u8; 4] = b"GDCS";
const RECORD_VERSION: u32 = 1;

/// Per-column cache payload, tagged by column type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnVariant {
    /// Numerical column cache metadata.
    Numerical {
        /// Value substituted for missing entries (dataset mean).
        replacement_missing_value: f64,
        /// Number of distinct values observed in the dataset.
        num_unique_values: u64,
        /// Whether the cached column is stored discretized.
        discretized: bool,
        /// Number of discretized levels when `discretized` is set.
        num_discretized_values: u64,
    },
    /// Categorical column cache metadata.
    Categorical {
        /// Size of the category dictionary.
        num_values: i64,
        /// Value substituted for missing entries (most frequent value).
        replacement_missing_value: i64,
    },
    /// Boolean column cache metadata.
    Boolean {
        /// Value substituted for missing entries (majority class).
        replacement_missing_value: bool,
    },
}

/// Cache metadata slot for one dataset column.
///
/// The slot list is always index-aligned with the dataset
/// specification; columns outside the selected subset keep
/// `available = false` and no variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnMeta {
    /// Whether the column is part of the cache.
    pub available: bool,
    /// Type-specific payload for available columns.
    pub variant: Option<ColumnVariant>,
}

/// Root persisted artifact of a completed cache build. Write-once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// Total number of examples across all output shards.
    pub num_examples: u64,
    /// Number of output shards in the cache.
    pub num_shards: usize,
    /// Index of the label column, if configured.
    pub label_column_idx: Option<usize>,
    /// Index of the weight column, if configured.
    pub weight_column_idx: Option<usize>,
    /// One slot per dataset column, index-aligned with the dataset
    /// specification.
    pub columns: Vec<ColumnMeta>,
}

/// Persisted completion marker of one output shard. Write-once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardMetadata {
    /// Number of examples in the shard.
    pub num_examples: u64,
}

impl CacheMetadata {
    /// Writes the root record at `path`.
    ///
    /// # Errors
    /// Returns an IO error for filesystem or serialization failures.
    pub fn write(&self, path: &Path) -> Result<()> {
        write_binary_record(path, METADATA_MAGIC, self)
    }

    /// Reads the root record at `path`.
    ///
    /// # Errors
    /// Returns an IO error for a missing file, a foreign or truncated
    /// envelope, or a payload that does not decode.
    pub fn read(path: &Path) -> Result<Self> {
        read_binary_record(path, METADATA_MAGIC)
    }
}

impl ShardMetadata {
    /// Writes the shard record at `path`.
    ///
    /// # Errors
    /// Returns an IO error for filesystem or serialization failures.
    pub fn write(&self, path: &Path) -> Result<()> {
        write_binary_record(path, SHARD_MAGIC, self)
    }

    /// Reads the shard record at `path`.
    ///
    /// # Errors
    /// Returns an IO error for a missing file, a foreign or truncated
    /// envelope, or a payload that does not decode.
    pub fn read(path: &Path) -> Result<Self> {
        read_binary_record(path, SHARD_MAGIC)
    }
}

fn write_binary_record<T: Serialize>(path: &Path, magic: &[u8; 4], record: &T) -> Result<()> {
    let payload = serde_json::to_vec(record)
        .map_err(|e| GroveError::Io(std::io::Error::other(format!("record encode failed: {e}"))))?;
    let mut out = Vec::with_capacity(12 + payload.len());
    out.extend_from_slice(magic);
    out.extend_from_slice(&RECORD_VERSION.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(&payload);
    fs::write(path, out)?;
    Ok(())
}

fn read_binary_record<T: DeserializeOwned>(path: &Path, magic: &[u8; 4]) -> Result<T> {
    let raw = fs::read(path)?;
    if raw.len() < 12 || &raw[0..4] != magic {
        return Err(GroveError::Io(std::io::Error::other(format!(
            "'{}' is not a grove cache record",
            path.display()
        ))));
    }
    let version = u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]);
    if version != RECORD_VERSION {
        return Err(GroveError::Io(std::io::Error::other(format!(
            "unsupported record version {version} in '{}'",
            path.display()
        ))));
    }
    let len = u32::from_le_bytes([raw[8], raw[9], raw[10], raw[11]]) as usize;
    let payload = raw.get(12..12 + len).ok_or_else(|| {
        GroveError::Io(std::io::Error::other(format!(
            "truncated record payload in '{}'",
            path.display()
        )))
    })?;
    serde_json::from_slice(payload)
        .map_err(|e| GroveError::Io(std::io::Error::other(format!("record decode failed: {e}"))))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn temp_record_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        std::env::temp_dir().join(format!("grove_record_{name}_{nanos}"))
    }

    #[test]
    fn cache_metadata_round_trips_through_envelope() {
        let path = temp_record_path("meta");
        let meta = CacheMetadata {
            num_examples: 42,
            num_shards: 3,
            label_column_idx: Some(0),
            weight_column_idx: None,
            columns: vec![
                ColumnMeta {
                    available: true,
                    variant: Some(ColumnVariant::Numerical {
                        replacement_missing_value: 1.5,
                        num_unique_values: 9,
                        discretized: false,
                        num_discretized_values: 0,
                    }),
                },
                ColumnMeta::default(),
            ],
        };
        meta.write(&path).expect("write");
        let restored = CacheMetadata::read(&path).expect("read");
        assert_eq!(restored, meta);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn rejects_foreign_magic() {
        let path = temp_record_path("magic");
        std::fs::write(&path, b"NOPE\x01\x00\x00\x00\x02\x00\x00\x00{}").expect("write raw");
        assert!(CacheMetadata::read(&path).is_err());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn shard_record_does_not_decode_as_root_record() {
        let path = temp_record_path("mixed");
        ShardMetadata { num_examples: 7 }.write(&path).expect("write");
        assert!(CacheMetadata::read(&path).is_err());
        let shard = ShardMetadata::read(&path).expect("read as shard");
        assert_eq!(shard.num_examples, 7);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn rejects_truncated_payload() {
        let path = temp_record_path("trunc");
        let mut raw = Vec::new();
        raw.extend_from_slice(b"GDCS");
        raw.extend_from_slice(&1_u32.to_le_bytes());
        raw.extend_from_slice(&100_u32.to_le_bytes());
        raw.extend_from_slice(b"{}");
        std::fs::write(&path, raw).expect("write raw");
        assert!(ShardMetadata::read(&path).is_err());
        let _ = std::fs::remove_file(path);
    }
}
