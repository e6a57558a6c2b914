//! Cache build coordination: planning, dispatch, collection, and
//! finalization.
//!
//! Responsibilities:
//! - short-circuit on an already-built cache (no re-validation);
//! - derive per-column metadata from the dataset specification;
//! - dispatch column-separation jobs over the worker pool with a
//!   skip-if-done fast path per output shard;
//! - collect unordered results, persisting one shard marker each;
//! - persist the root metadata only after every job is accounted for.
//!
//! Resumability: each shard marker is written the moment its job
//! completes, before being folded into any aggregate, so a restarted
//! build dispatches only the jobs whose marker is still missing.
//! Re-running a job is safe because its output location is
//! deterministic and fully overwritten. All mutable build state lives
//! in this invocation; nothing is shared across builds.

use std::fs;
use std::path::Path;

use grove_common::{BuildConfig, CacheTuning, GroveError, Result};
use grove_distribute::Manager;
use tracing::{debug, info};

use crate::layout;
use crate::metadata::{CacheMetadata, ColumnMeta, ColumnVariant, ShardMetadata};
use crate::plan::plan_shards;
use crate::protocol::{ColumnSeparationRequest, ColumnSeparationResult};
use crate::report::metadata_report;
use crate::schema::{ColumnStats, DataSpec};

/// Builds a column-oriented sharded cache from a row-oriented sharded
/// dataset, or loads the metadata of an already-built one.
///
/// An existing root metadata file short-circuits the build verbatim;
/// it is not validated against the current request. On failure the
/// root metadata is withheld but completed shard markers stay on disk,
/// so re-invoking resumes from the missing shards.
///
/// # Errors
/// Surfaces the first configuration, IO, distribution, or
/// unsupported-type fault; no internal retries.
pub fn build_dataset_cache(
    typed_path: &str,
    data_spec: &DataSpec,
    columns: Option<&[usize]>,
    cache_directory: &Path,
    config: &BuildConfig,
    tuning: &CacheTuning,
    manager: &dyn Manager,
) -> Result<CacheMetadata> {
    info!(
        cache_directory = %cache_directory.display(),
        dataset = typed_path,
        operator = "CacheBuild",
        "create dataset cache"
    );

    let metadata_path = layout::metadata_path(cache_directory);
    if metadata_path.exists() {
        info!(operator = "CacheBuild", "the dataset cache already exists");
        return CacheMetadata::read(&metadata_path);
    }

    fs::create_dir_all(cache_directory)?;
    fs::create_dir_all(layout::raw_dir(cache_directory))?;
    fs::create_dir_all(layout::indexed_dir(cache_directory))?;

    let effective_columns = effective_columns(data_spec, columns, config);
    info!(
        columns = effective_columns.len(),
        operator = "CacheBuild",
        "selected columns"
    );

    let mut metadata = initialize_metadata(data_spec, &effective_columns, config)?;

    let (dataset_format, pattern) = grove_common::split_type_and_path(typed_path)?;
    let dataset_shards = grove_common::expand_input_shards(pattern)?;
    info!(
        shards = dataset_shards.len(),
        operator = "CacheBuild",
        "resolved input shards"
    );

    separate_dataset_columns(
        &dataset_shards,
        dataset_format,
        data_spec,
        cache_directory,
        &effective_columns,
        config,
        tuning,
        manager,
        &mut metadata,
    )?;

    metadata.write(&metadata_path)?;
    manager.done()?;

    info!(
        report = %metadata_report(&metadata, None),
        operator = "CacheBuild",
        "dataset cache meta-data"
    );
    info!(
        num_examples = metadata.num_examples,
        num_shards = metadata.num_shards,
        operator = "CacheBuild",
        "dataset cache created"
    );
    Ok(metadata)
}

/// Loads the root metadata of a built cache.
///
/// # Errors
/// Returns an IO error for a missing or corrupt metadata file.
pub fn load_cache_metadata(cache_directory: &Path) -> Result<CacheMetadata> {
    CacheMetadata::read(&layout::metadata_path(cache_directory))
}

/// Returns the requested subset unioned with the label/weight columns,
/// sorted and deduplicated, or all columns when no subset is given.
pub fn effective_columns(
    data_spec: &DataSpec,
    columns: Option<&[usize]>,
    config: &BuildConfig,
) -> Vec<usize> {
    match columns {
        Some(subset) => {
            let mut effective = subset.to_vec();
            if let Some(label_idx) = config.label_column_idx {
                effective.push(label_idx);
            }
            if let Some(weight_idx) = config.weight_column_idx {
                effective.push(weight_idx);
            }
            effective.sort_unstable();
            effective.dedup();
            effective
        }
        None => (0..data_spec.num_columns()).collect(),
    }
}

/// Derives the persisted per-column metadata from the dataset
/// specification and build configuration.
///
/// One slot is allocated per dataset column regardless of selection;
/// unselected slots stay unavailable with no variant.
///
/// # Errors
/// `UnsupportedType` for a selected column outside
/// numerical/categorical/boolean; `InvalidConfig` when
/// `remove_zero_weighted_examples` lacks a numerical weight column.
pub fn initialize_metadata(
    data_spec: &DataSpec,
    columns: &[usize],
    config: &BuildConfig,
) -> Result<CacheMetadata> {
    let mut metadata = CacheMetadata {
        label_column_idx: config.label_column_idx,
        weight_column_idx: config.weight_column_idx,
        columns: vec![ColumnMeta::default(); data_spec.num_columns()],
        ..CacheMetadata::default()
    };

    for &col_idx in columns {
        let column = data_spec.columns.get(col_idx).ok_or_else(|| {
            GroveError::InvalidConfig(format!(
                "column index {col_idx} out of range for a dataset of {} column(s)",
                data_spec.num_columns()
            ))
        })?;
        let variant = match column.stats {
            ColumnStats::Numerical {
                mean,
                num_unique_values,
                discretized,
                num_discretized_values,
            } => ColumnVariant::Numerical {
                replacement_missing_value: mean,
                num_unique_values,
                discretized,
                num_discretized_values,
            },
            ColumnStats::Categorical {
                number_of_unique_values,
                most_frequent_value,
            } => ColumnVariant::Categorical {
                num_values: number_of_unique_values,
                replacement_missing_value: most_frequent_value,
            },
            ColumnStats::Boolean {
                count_true,
                count_false,
            } => ColumnVariant::Boolean {
                replacement_missing_value: count_true >= count_false,
            },
            ColumnStats::Text => {
                return Err(GroveError::UnsupportedType(format!(
                    "{} for column '{}'",
                    column.stats.type_name(),
                    column.name
                )));
            }
        };
        metadata.columns[col_idx] = ColumnMeta {
            available: true,
            variant: Some(variant),
        };
    }

    if config.remove_zero_weighted_examples {
        let Some(weight_idx) = config.weight_column_idx else {
            return Err(GroveError::InvalidConfig(
                "'remove_zero_weighted_examples' without a weight column".to_string(),
            ));
        };
        let weight_spec = data_spec.columns.get(weight_idx).ok_or_else(|| {
            GroveError::InvalidConfig(format!(
                "weight column index {weight_idx} out of range for a dataset of {} column(s)",
                data_spec.num_columns()
            ))
        })?;
        if !matches!(weight_spec.stats, ColumnStats::Numerical { .. }) {
            return Err(GroveError::InvalidConfig(
                "'remove_zero_weighted_examples' only supports numerical weight columns"
                    .to_string(),
            ));
        }
    }

    Ok(metadata)
}

/// Dispatches column-separation jobs and collects their unordered
/// results, updating `metadata` with the shard count and the running
/// example total.
#[allow(clippy::too_many_arguments)]
pub(crate) fn separate_dataset_columns(
    dataset_shards: &[String],
    dataset_format: &str,
    data_spec: &DataSpec,
    cache_directory: &Path,
    columns: &[usize],
    config: &BuildConfig,
    tuning: &CacheTuning,
    manager: &dyn Manager,
    metadata: &mut CacheMetadata,
) -> Result<()> {
    info!(operator = "CacheSeparate", "start separating dataset by columns");

    let num_workers = manager.num_workers();
    if num_workers == 0 {
        return Err(GroveError::Distribution(
            "worker pool has no workers".to_string(),
        ));
    }

    metadata.num_examples = 0;

    let plan = plan_shards(dataset_shards.len(), num_workers, tuning.shards_per_worker);
    metadata.num_shards = plan.num_output_shards;
    info!(
        num_output_shards = plan.num_output_shards,
        num_input_shards = dataset_shards.len(),
        shards_per_request = plan.shards_per_request,
        num_workers,
        operator = "CacheSeparate",
        "planned column-separation jobs"
    );

    // Column-separation requests are heavy; one in flight per worker
    // for the whole phase.
    manager.set_parallel_execution_per_worker(1)?;

    let column_idx_remove_example_with_zero = if config.remove_zero_weighted_examples {
        config.weight_column_idx
    } else {
        None
    };

    let mut pending_requests = 0_usize;
    for output_shard_idx in 0..plan.num_output_shards {
        let marker_path =
            layout::shard_metadata_path(cache_directory, output_shard_idx, plan.num_output_shards);
        if marker_path.exists() {
            let shard = ShardMetadata::read(&marker_path)?;
            metadata.num_examples += shard.num_examples;
            debug!(
                shard_idx = output_shard_idx,
                num_examples = shard.num_examples,
                operator = "CacheSeparate",
                "job result already on disk; skipping dispatch"
            );
            continue;
        }

        let input_range = plan.input_range(output_shard_idx, dataset_shards.len());
        let request = ColumnSeparationRequest {
            columns: columns.to_vec(),
            data_spec: data_spec.clone(),
            output_directory: cache_directory.display().to_string(),
            num_shards: plan.num_output_shards,
            shard_idx: output_shard_idx,
            dataset_path: format!("{dataset_format}:{}", dataset_shards[input_range].join(",")),
            column_idx_remove_example_with_zero,
        };
        manager.submit(
            plan.worker_for_shard(output_shard_idx, num_workers),
            request.encode()?,
        )?;
        pending_requests += 1;
    }

    for result_idx in 0..pending_requests {
        let result = ColumnSeparationResult::decode(&manager.next_result()?)?;
        if result.shard_idx >= plan.num_output_shards {
            return Err(GroveError::Distribution(format!(
                "worker answered for shard {} of a {}-shard cache",
                result.shard_idx, plan.num_output_shards
            )));
        }

        let marker_path =
            layout::shard_metadata_path(cache_directory, result.shard_idx, plan.num_output_shards);
        ShardMetadata {
            num_examples: result.num_examples,
        }
        .write(&marker_path)?;
        metadata.num_examples += result.num_examples;

        debug!(
            shard_idx = result.shard_idx,
            collected = result_idx + 1,
            pending = pending_requests,
            operator = "CacheSeparate",
            "collected column-separation result"
        );
    }

    manager.set_parallel_execution_per_worker(tuning.parallel_execution_per_worker)?;

    info!(
        num_examples = metadata.num_examples,
        operator = "CacheSeparate",
        "column separation done"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use crate::schema::ColumnSpec;

    use super::*;

    fn numerical(name: &str) -> ColumnSpec {
        ColumnSpec {
            name: name.to_string(),
            stats: ColumnStats::Numerical {
                mean: 1.0,
                num_unique_values: 5,
                discretized: false,
                num_discretized_values: 0,
            },
        }
    }

    fn data_spec() -> DataSpec {
        DataSpec {
            columns: vec![
                numerical("f0"),
                ColumnSpec {
                    name: "cat".to_string(),
                    stats: ColumnStats::Categorical {
                        number_of_unique_values: 4,
                        most_frequent_value: 2,
                    },
                },
                ColumnSpec {
                    name: "flag".to_string(),
                    stats: ColumnStats::Boolean {
                        count_true: 3,
                        count_false: 9,
                    },
                },
                numerical("weight"),
            ],
        }
    }

    #[test]
    fn subset_is_unioned_with_label_and_weight_and_deduplicated() {
        let config = BuildConfig {
            label_column_idx: Some(0),
            weight_column_idx: Some(3),
            remove_zero_weighted_examples: false,
        };
        assert_eq!(
            effective_columns(&data_spec(), Some(&[2, 0, 2]), &config),
            vec![0, 2, 3]
        );
        assert_eq!(
            effective_columns(&data_spec(), None, &config),
            vec![0, 1, 2, 3]
        );
    }

    #[test]
    fn metadata_has_one_slot_per_dataset_column_even_for_empty_subset() {
        let metadata =
            initialize_metadata(&data_spec(), &[], &BuildConfig::default()).expect("metadata");
        assert_eq!(metadata.columns.len(), 4);
        assert!(metadata.columns.iter().all(|c| !c.available));
        assert!(metadata.columns.iter().all(|c| c.variant.is_none()));
    }

    #[test]
    fn selected_columns_get_type_matched_replacement_values() {
        let metadata =
            initialize_metadata(&data_spec(), &[0, 1, 2], &BuildConfig::default()).expect("metadata");
        assert!(matches!(
            metadata.columns[0].variant,
            Some(ColumnVariant::Numerical {
                replacement_missing_value,
                ..
            }) if replacement_missing_value == 1.0
        ));
        assert!(matches!(
            metadata.columns[1].variant,
            Some(ColumnVariant::Categorical {
                num_values: 4,
                replacement_missing_value: 2,
            })
        ));
        // False majority: 3 true vs 9 false.
        assert!(matches!(
            metadata.columns[2].variant,
            Some(ColumnVariant::Boolean {
                replacement_missing_value: false,
            })
        ));
        assert!(!metadata.columns[3].available);
    }

    #[test]
    fn text_column_is_rejected() {
        let mut data_spec = data_spec();
        data_spec.columns.push(ColumnSpec {
            name: "notes".to_string(),
            stats: ColumnStats::Text,
        });
        let err = initialize_metadata(&data_spec, &[4], &BuildConfig::default())
            .expect_err("text must be rejected");
        assert!(matches!(err, GroveError::UnsupportedType(_)));
    }

    #[test]
    fn zero_weight_removal_requires_a_numerical_weight_column() {
        let missing = BuildConfig {
            remove_zero_weighted_examples: true,
            ..BuildConfig::default()
        };
        assert!(matches!(
            initialize_metadata(&data_spec(), &[0], &missing),
            Err(GroveError::InvalidConfig(_))
        ));

        let categorical_weight = BuildConfig {
            weight_column_idx: Some(1),
            remove_zero_weighted_examples: true,
            ..BuildConfig::default()
        };
        assert!(matches!(
            initialize_metadata(&data_spec(), &[0, 1], &categorical_weight),
            Err(GroveError::InvalidConfig(_))
        ));
    }

    struct IdleManager;

    impl Manager for IdleManager {
        fn num_workers(&self) -> usize {
            4
        }
        fn submit(&self, _worker_idx: usize, _request: Vec<u8>) -> Result<()> {
            Err(GroveError::Distribution(
                "no submissions expected".to_string(),
            ))
        }
        fn next_result(&self) -> Result<Vec<u8>> {
            Err(GroveError::Distribution("no results expected".to_string()))
        }
        fn set_parallel_execution_per_worker(&self, _limit: usize) -> Result<()> {
            Ok(())
        }
        fn done(&self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn empty_input_yields_zero_jobs_and_zero_examples() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let dir: PathBuf = std::env::temp_dir().join(format!("grove_empty_input_{nanos}"));
        std::fs::create_dir_all(&dir).expect("cache dir");

        let mut metadata =
            initialize_metadata(&data_spec(), &[0], &BuildConfig::default()).expect("metadata");
        separate_dataset_columns(
            &[],
            "csv",
            &data_spec(),
            &dir,
            &[0],
            &BuildConfig::default(),
            &CacheTuning::default(),
            &IdleManager,
            &mut metadata,
        )
        .expect("empty separation");
        assert_eq!(metadata.num_shards, 0);
        assert_eq!(metadata.num_examples, 0);

        let _ = std::fs::remove_dir_all(dir);
    }
}
