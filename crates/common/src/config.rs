use serde::{Deserialize, Serialize};

/// Per-build cache construction options.
///
/// Column indices refer to positions in the dataset specification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Index of the label column, if any.
    pub label_column_idx: Option<usize>,
    /// Index of the weight column, if any.
    pub weight_column_idx: Option<usize>,
    /// Drop examples whose weight is zero during column separation.
    ///
    /// Requires a numerical `weight_column_idx`.
    pub remove_zero_weighted_examples: bool,
}

/// Tuning knobs for the cache build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheTuning {
    /// Target number of output shards prepared per worker.
    ///
    /// Higher values make the build more robust to slow workers but
    /// increase the number of files each worker has to keep open.
    pub shards_per_worker: usize,
    /// Per-worker request concurrency outside the column-separation
    /// phase. Separation itself always runs with one in-flight request
    /// per worker and restores this limit afterwards.
    pub parallel_execution_per_worker: usize,
}

impl Default for CacheTuning {
    fn default() -> Self {
        Self {
            shards_per_worker: 10,
            parallel_execution_per_worker: 5,
        }
    }
}
