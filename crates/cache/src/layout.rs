//! Deterministic on-disk layout of a dataset cache directory.
//!
//! Under the cache root:
//! - `metadata`: binary-serialized root [`crate::metadata::CacheMetadata`]
//! - `raw/`, `indexed/`: column payload directories populated by the
//!   column-separation and indexing workers
//! - `shard_metadata_#####-of-#####`: one completion marker per output
//!   shard

use std::path::{Path, PathBuf};

/// Root metadata filename.
pub const FILENAME_METADATA: &str = "metadata";
/// Raw column payload directory name.
pub const FILENAME_RAW: &str = "raw";
/// Columnar index directory name.
pub const FILENAME_INDEXED: &str = "indexed";

/// Path of the root cache metadata file.
pub fn metadata_path(cache_directory: &Path) -> PathBuf {
    cache_directory.join(FILENAME_METADATA)
}

/// Path of the raw column payload directory.
pub fn raw_dir(cache_directory: &Path) -> PathBuf {
    cache_directory.join(FILENAME_RAW)
}

/// Path of the columnar index directory.
pub fn indexed_dir(cache_directory: &Path) -> PathBuf {
    cache_directory.join(FILENAME_INDEXED)
}

/// Path of one output shard's completion marker.
pub fn shard_metadata_path(
    cache_directory: &Path,
    shard_idx: usize,
    num_shards: usize,
) -> PathBuf {
    cache_directory.join(format!("shard_metadata_{shard_idx:05}-of-{num_shards:05}"))
}
