//! Typed dataset path parsing and input-shard expansion.
//!
//! A typed path has the form `"<format>:<path-pattern>[@<shard-count>]"`,
//! for example `"csv:/data/train@2"` which names the two shard files
//! `/data/train-00000-of-00002` and `/data/train-00001-of-00002`.

use crate::error::{GroveError, Result};

/// Splits `"csv:/a/b@2"` into `("csv", "/a/b@2")`.
pub fn split_type_and_path(typed_path: &str) -> Result<(&str, &str)> {
    let Some((format, path)) = typed_path.split_once(':') else {
        return Err(GroveError::InvalidConfig(format!(
            "typed path '{typed_path}' is missing a '<format>:' prefix"
        )));
    };
    if format.is_empty() || path.is_empty() {
        return Err(GroveError::InvalidConfig(format!(
            "typed path '{typed_path}' has an empty format or path component"
        )));
    }
    Ok((format, path))
}

/// Expands a possibly-sharded path pattern into an ordered shard list.
///
/// `"/a/b@2"` expands to `["/a/b-00000-of-00002", "/a/b-00001-of-00002"]`;
/// a pattern without `@n` expands to itself.
pub fn expand_input_shards(pattern: &str) -> Result<Vec<String>> {
    let Some((base, count)) = pattern.rsplit_once('@') else {
        return Ok(vec![pattern.to_string()]);
    };
    let num_shards: usize = count.parse().map_err(|_| {
        GroveError::InvalidConfig(format!(
            "invalid shard count '{count}' in sharded path '{pattern}'"
        ))
    })?;
    if num_shards == 0 {
        return Err(GroveError::InvalidConfig(format!(
            "sharded path '{pattern}' must name at least one shard"
        )));
    }
    Ok((0..num_shards)
        .map(|idx| format!("{base}-{idx:05}-of-{num_shards:05}"))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_format_and_path() {
        let (format, path) = split_type_and_path("csv:/a/b@2").expect("split");
        assert_eq!(format, "csv");
        assert_eq!(path, "/a/b@2");
    }

    #[test]
    fn rejects_path_without_format() {
        assert!(split_type_and_path("/a/b@2").is_err());
        assert!(split_type_and_path(":/a/b").is_err());
    }

    #[test]
    fn expands_sharded_pattern() {
        let shards = expand_input_shards("/a/b@2").expect("expand");
        assert_eq!(
            shards,
            vec!["/a/b-00000-of-00002", "/a/b-00001-of-00002"]
        );
    }

    #[test]
    fn plain_path_expands_to_itself() {
        let shards = expand_input_shards("/a/b.csv").expect("expand");
        assert_eq!(shards, vec!["/a/b.csv"]);
    }

    #[test]
    fn rejects_zero_or_malformed_shard_count() {
        assert!(expand_input_shards("/a/b@0").is_err());
        assert!(expand_input_shards("/a/b@two").is_err());
    }
}
