use thiserror::Error;

/// Canonical grove error taxonomy used across crates.
///
/// Classification guidance:
/// - [`GroveError::InvalidConfig`]: invalid configuration or column combination
/// - [`GroveError::Io`]: raw filesystem IO and metadata serialization failures
/// - [`GroveError::Distribution`]: worker-pool startup, dispatch, or collection failures
/// - [`GroveError::UnsupportedType`]: column type outside the supported set
#[derive(Debug, Error)]
pub enum GroveError {
    /// Invalid or inconsistent configuration state.
    ///
    /// Examples:
    /// - `remove_zero_weighted_examples` without a weight column
    /// - non-numerical weight column
    /// - malformed typed dataset path
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Transparent std IO failures, including metadata serialization
    /// faults wrapped into `io::Error` values.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Worker-pool dispatch/collection failures.
    ///
    /// Examples:
    /// - request submitted to an out-of-range worker index
    /// - a worker thread disconnected before answering
    /// - drain/done failures at pool shutdown
    #[error("distribution error: {0}")]
    Distribution(String),

    /// Valid request for a column type the cache does not support.
    #[error("unsupported column type: {0}")]
    UnsupportedType(String),
}

/// Standard grove result alias.
pub type Result<T> = std::result::Result<T, GroveError>;
