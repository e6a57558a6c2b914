//! Shared configuration, error types, and path utilities for grove crates.
//!
//! Architecture role:
//! - defines the build/tuning configuration passed across layers
//! - provides common [`GroveError`] / [`Result`] contracts
//! - hosts typed-path parsing and input-shard expansion helpers
//!
//! Key modules:
//! - [`config`]
//! - [`error`]
//! - [`paths`]

pub mod config;
pub mod error;
pub mod paths;

pub use config::{BuildConfig, CacheTuning};
pub use error::{GroveError, Result};
pub use paths::{expand_input_shards, split_type_and_path};
