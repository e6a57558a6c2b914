//! Wire types exchanged with column-separation workers.
//!
//! The manager transports opaque bytes; these types define the JSON
//! payload both sides agree on. One request turns a contiguous range
//! of row-oriented input shards into one output shard with one file
//! per selected column.

use grove_common::{GroveError, Result};
use serde::{Deserialize, Serialize};

use crate::schema::DataSpec;

/// One column-separation job sent to a worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSeparationRequest {
    /// Indices of the columns to separate, in dataset order.
    pub columns: Vec<usize>,
    /// Dataset specification the input shards conform to.
    pub data_spec: DataSpec,
    /// Cache root directory the worker writes column files under.
    pub output_directory: String,
    /// Total number of output shards in the cache.
    pub num_shards: usize,
    /// Output shard produced by this request.
    pub shard_idx: usize,
    /// Typed path of the covered input shards
    /// (`"<format>:<path>,<path>,..."`).
    pub dataset_path: String,
    /// Weight column used to drop zero-weighted examples, if enabled.
    pub column_idx_remove_example_with_zero: Option<usize>,
}

/// Completion report for one column-separation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSeparationResult {
    /// Output shard this result belongs to.
    pub shard_idx: usize,
    /// Number of examples written into the shard.
    pub num_examples: u64,
}

impl ColumnSeparationRequest {
    /// Encodes the request for a [`grove_distribute::Manager`] submit.
    ///
    /// # Errors
    /// Returns a distribution error when encoding fails.
    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| GroveError::Distribution(format!("request encode failed: {e}")))
    }

    /// Decodes a request on the worker side.
    ///
    /// # Errors
    /// Returns a distribution error for a malformed payload.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        serde_json::from_slice(payload)
            .map_err(|e| GroveError::Distribution(format!("request decode failed: {e}")))
    }
}

impl ColumnSeparationResult {
    /// Encodes the result for the manager's result channel.
    ///
    /// # Errors
    /// Returns a distribution error when encoding fails.
    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| GroveError::Distribution(format!("result encode failed: {e}")))
    }

    /// Decodes a collected result on the coordinator side.
    ///
    /// # Errors
    /// Returns a distribution error for a malformed payload.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        serde_json::from_slice(payload)
            .map_err(|e| GroveError::Distribution(format!("result decode failed: {e}")))
    }
}
