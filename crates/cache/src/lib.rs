//! Column-oriented, sharded dataset cache construction for
//! distributed tree learning.
//!
//! Architecture role:
//! - plans how row-oriented input shards map to output jobs;
//! - dispatches column-separation work over a
//!   [`grove_distribute::Manager`] pool and collects unordered results;
//! - persists per-shard completion markers so interrupted builds
//!   resume from the missing shards only;
//! - renders persisted metadata into a human-readable summary.
//!
//! Key modules:
//! - [`schema`]: read-only dataset specification input
//! - [`metadata`]: persisted records and their binary envelope
//! - [`layout`]: deterministic cache directory layout
//! - [`plan`]: input-shard to output-job mapping
//! - [`protocol`]: worker request/response wire types
//! - [`builder`]: the build state machine
//! - [`report`]: metadata summary text

pub mod builder;
pub mod layout;
pub mod metadata;
pub mod plan;
pub mod protocol;
pub mod report;
pub mod schema;

pub use builder::{build_dataset_cache, effective_columns, initialize_metadata, load_cache_metadata};
pub use metadata::{CacheMetadata, ColumnMeta, ColumnVariant, ShardMetadata};
pub use plan::{plan_shards, ShardPlan};
pub use protocol::{ColumnSeparationRequest, ColumnSeparationResult};
pub use report::metadata_report;
pub use schema::{ColumnSpec, ColumnStats, DataSpec};
