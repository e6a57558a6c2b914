//! Dataset specification consumed by the cache builder.
//!
//! The specification is read-only input: an ordered column list with
//! per-column dataset-wide statistics computed upstream. Statistics
//! are a closed tagged variant; every consumer matches all variants
//! exhaustively.

use serde::{Deserialize, Serialize};

/// Dataset-wide statistics of one column, tagged by column type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnStats {
    /// Numerical column statistics.
    Numerical {
        /// Mean of the observed values.
        mean: f64,
        /// Number of distinct observed values.
        num_unique_values: u64,
        /// Whether the column is bucketed into discretized levels.
        discretized: bool,
        /// Number of discretized levels when `discretized` is set.
        num_discretized_values: u64,
    },
    /// Categorical column statistics.
    Categorical {
        /// Size of the category dictionary.
        number_of_unique_values: i64,
        /// Most frequently observed category value.
        most_frequent_value: i64,
    },
    /// Boolean column statistics.
    Boolean {
        /// Count of true values.
        count_true: u64,
        /// Count of false values.
        count_false: u64,
    },
    /// Free-text column; not representable in the cache.
    Text,
}

impl ColumnStats {
    /// Human-readable type name used in errors and reports.
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnStats::Numerical { .. } => "NUMERICAL",
            ColumnStats::Categorical { .. } => "CATEGORICAL",
            ColumnStats::Boolean { .. } => "BOOLEAN",
            ColumnStats::Text => "TEXT",
        }
    }
}

/// One column of the dataset specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name as it appears in the source dataset.
    pub name: String,
    /// Type-tagged dataset-wide statistics.
    pub stats: ColumnStats,
}

/// Ordered column specification of the input dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSpec {
    /// Columns in dataset order; cache metadata stays index-aligned
    /// with this list.
    pub columns: Vec<ColumnSpec>,
}

impl DataSpec {
    /// Number of columns in the specification.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }
}
