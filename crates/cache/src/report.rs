//! Human-readable summary of persisted cache metadata.

use std::fmt::Write as _;

use crate::metadata::{CacheMetadata, ColumnVariant};

/// Renders a summary of `metadata`, restricted to `features` when
/// given (defaults to all columns). Pure and infallible; callers
/// guarantee feature indices are in range.
pub fn metadata_report(metadata: &CacheMetadata, features: Option<&[usize]>) -> String {
    let effective_features: Vec<usize> = match features {
        Some(subset) => subset.to_vec(),
        None => (0..metadata.columns.len()).collect(),
    };

    let mut num_numerical = 0_u64;
    let mut num_categorical = 0_u64;
    let mut num_boolean = 0_u64;
    let mut num_unknown = 0_u64;
    let mut sum_num_unique_values = 0_u64;
    let mut num_discretized = 0_u64;
    let mut sum_num_discretized_values = 0_u64;
    let mut num_less_100_values = 0_u64;
    let mut num_less_16k_values = 0_u64;

    for &feature in &effective_features {
        match metadata.columns[feature].variant {
            Some(ColumnVariant::Numerical {
                num_unique_values,
                discretized,
                num_discretized_values,
                ..
            }) => {
                num_numerical += 1;
                sum_num_unique_values += num_unique_values;
                if discretized {
                    num_discretized += 1;
                    sum_num_discretized_values += num_discretized_values;
                }
                if num_unique_values <= 100 {
                    num_less_100_values += 1;
                }
                if num_unique_values <= 16_000 {
                    num_less_16k_values += 1;
                }
            }
            Some(ColumnVariant::Categorical { .. }) => num_categorical += 1,
            Some(ColumnVariant::Boolean { .. }) => num_boolean += 1,
            None => num_unknown += 1,
        }
    }

    let mut report = String::new();
    let _ = writeln!(report, "Number of columns: {}", metadata.columns.len());
    let _ = writeln!(report, "Number of examples: {}", metadata.num_examples);
    let _ = writeln!(
        report,
        "Statistics on {} / {} features",
        effective_features.len(),
        metadata.columns.len()
    );

    let _ = writeln!(report, "Columns by type");
    for (type_name, count) in [
        ("NUMERICAL", num_numerical),
        ("CATEGORICAL", num_categorical),
        ("BOOLEAN", num_boolean),
        ("UNKNOWN", num_unknown),
    ] {
        if count > 0 {
            let _ = writeln!(report, "\t column-type: {type_name} count: {count}");
        }
    }

    if num_numerical > 0 {
        let _ = writeln!(report, "Numerical columns:");
        let _ = writeln!(
            report,
            "\tMean number of unique values: {}",
            sum_num_unique_values / num_numerical
        );
        let _ = writeln!(
            report,
            "\tRatio of discretized numerical columns: {:.2} ({})",
            num_discretized as f64 / num_numerical as f64,
            num_discretized
        );
        let _ = writeln!(
            report,
            "\tRatio of numerical columns with <=100 values: {:.2} ({})",
            num_less_100_values as f64 / num_numerical as f64,
            num_less_100_values
        );
        let _ = writeln!(
            report,
            "\tRatio of numerical columns with <=16k values: {:.2} ({})",
            num_less_16k_values as f64 / num_numerical as f64,
            num_less_16k_values
        );
        if num_discretized > 0 {
            let _ = writeln!(
                report,
                "\tMean number of unique values for discretized columns: {:.2}",
                sum_num_discretized_values as f64 / num_discretized as f64
            );
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use crate::metadata::ColumnMeta;

    use super::*;

    fn numerical_column(num_unique_values: u64, discretized: bool) -> ColumnMeta {
        ColumnMeta {
            available: true,
            variant: Some(ColumnVariant::Numerical {
                replacement_missing_value: 0.0,
                num_unique_values,
                discretized,
                num_discretized_values: if discretized { 32 } else { 0 },
            }),
        }
    }

    #[test]
    fn summarizes_numerical_unique_value_distribution() {
        // Unique counts {50, 150, 9}: mean 69 by integer division,
        // two of three columns at or below 100 unique values.
        let metadata = CacheMetadata {
            num_examples: 1000,
            num_shards: 4,
            columns: vec![
                numerical_column(50, false),
                numerical_column(150, false),
                numerical_column(9, false),
            ],
            ..CacheMetadata::default()
        };
        let report = metadata_report(&metadata, None);
        assert!(report.contains("Number of columns: 3"));
        assert!(report.contains("Number of examples: 1000"));
        assert!(report.contains("Statistics on 3 / 3 features"));
        assert!(report.contains("\t column-type: NUMERICAL count: 3"));
        assert!(report.contains("Mean number of unique values: 69"));
        assert!(report.contains("Ratio of numerical columns with <=100 values: 0.67 (2)"));
        assert!(report.contains("Ratio of numerical columns with <=16k values: 1.00 (3)"));
        assert!(report.contains("Ratio of discretized numerical columns: 0.00 (0)"));
        assert!(!report.contains("Mean number of unique values for discretized columns"));
    }

    #[test]
    fn feature_subset_restricts_the_statistics() {
        let metadata = CacheMetadata {
            columns: vec![
                numerical_column(50, false),
                numerical_column(150, false),
                ColumnMeta {
                    available: true,
                    variant: Some(ColumnVariant::Boolean {
                        replacement_missing_value: true,
                    }),
                },
            ],
            ..CacheMetadata::default()
        };
        let report = metadata_report(&metadata, Some(&[0, 2]));
        assert!(report.contains("Statistics on 2 / 3 features"));
        assert!(report.contains("\t column-type: NUMERICAL count: 1"));
        assert!(report.contains("\t column-type: BOOLEAN count: 1"));
        assert!(report.contains("Mean number of unique values: 50"));
    }

    #[test]
    fn discretized_columns_report_their_mean_level_count() {
        let metadata = CacheMetadata {
            columns: vec![numerical_column(500, true), numerical_column(40, false)],
            ..CacheMetadata::default()
        };
        let report = metadata_report(&metadata, None);
        assert!(report.contains("Ratio of discretized numerical columns: 0.50 (1)"));
        assert!(report.contains("Mean number of unique values for discretized columns: 32.00"));
    }

    #[test]
    fn unavailable_columns_count_as_unknown_and_skip_numerical_block() {
        let metadata = CacheMetadata {
            columns: vec![ColumnMeta::default(), ColumnMeta::default()],
            ..CacheMetadata::default()
        };
        let report = metadata_report(&metadata, None);
        assert!(report.contains("\t column-type: UNKNOWN count: 2"));
        assert!(!report.contains("Numerical columns:"));
    }
}
