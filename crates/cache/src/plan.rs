//! Shard planning: how many output jobs to create and which input
//! shards each covers.
//!
//! Grouping several input shards per job bounds per-worker open-file
//! and memory overhead while amortizing per-request dispatch cost.
//! When the input is small relative to the pool, the plan degenerates
//! to one job per input shard.

use std::ops::Range;

/// Mapping of input shards to output-shard jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardPlan {
    /// Input shards combined into one output shard.
    pub shards_per_request: usize,
    /// Number of output shards (one job each).
    pub num_output_shards: usize,
}

impl ShardPlan {
    /// Input shard range `[begin, end)` covered by one output shard.
    pub fn input_range(&self, output_shard_idx: usize, num_input_shards: usize) -> Range<usize> {
        let begin = output_shard_idx * self.shards_per_request;
        let end = num_input_shards.min((output_shard_idx + 1) * self.shards_per_request);
        begin..end
    }

    /// Round-robin worker assignment for one output shard.
    pub fn worker_for_shard(&self, output_shard_idx: usize, num_workers: usize) -> usize {
        output_shard_idx % num_workers
    }
}

/// Plans output-shard jobs for `num_input_shards` over `num_workers`
/// workers, targeting `shards_per_worker` output shards per worker.
pub fn plan_shards(
    num_input_shards: usize,
    num_workers: usize,
    shards_per_worker: usize,
) -> ShardPlan {
    let shards_per_request =
        1.max(num_input_shards / (num_workers * shards_per_worker).max(1));
    let num_output_shards = num_input_shards.div_ceil(shards_per_request);
    ShardPlan {
        shards_per_request,
        num_output_shards,
    }
}
