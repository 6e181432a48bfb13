//! Helper utilities for config file path handling.

use crate::ConfigError;
use globset::GlobMatcher;
use std::fs;
use std::path::{Path, PathBuf};

/// Split a colon-delimited path list, skipping empty segments.
pub(super) fn split_path_list(list: &str) -> impl Iterator<Item = PathBuf> + '_ {
    list.split(':')
        .filter(|segment| !segment.is_empty())
        .map(PathBuf::from)
}

/// Regular files directly under `dir` matching the pattern, by name descending.
pub(super) fn expand_dir(dir: &Path, matcher: &GlobMatcher) -> Result<Vec<PathBuf>, ConfigError> {
    let read_failed = |source: std::io::Error| ConfigError::ReadFailed {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_failed)? {
        let path = entry.map_err(read_failed)?.path();
        let matches = path
            .file_name()
            .is_some_and(|name| matcher.is_match(Path::new(name)));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| b.file_name().cmp(&a.file_name()));
    Ok(files)
}
