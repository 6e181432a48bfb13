//! Layer types and resolution metadata.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Layer a resolved value came from, highest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LayerSource {
    /// Programmatic override set at runtime.
    Override,
    /// Prefixed environment variable.
    Environment,
    /// Config file.
    File,
    /// Registered default.
    Default,
}

impl fmt::Display for LayerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerSource::Override => write!(f, "override"),
            LayerSource::Environment => write!(f, "environment"),
            LayerSource::File => write!(f, "file"),
            LayerSource::Default => write!(f, "default"),
        }
    }
}

/// Resolved value plus where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub value: Value,
    pub source: LayerSource,
    /// File that supplied the value, for file-layer values.
    pub path: Option<PathBuf>,
}

/// Directive values parsed from a single config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileFragment {
    pub path: PathBuf,
    pub values: Map<String, Value>,
}

/// Chain of file fragments; earlier fragments shadow later ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileLayer {
    fragments: Vec<FileFragment>,
}

impl FileLayer {
    pub(crate) fn new(fragments: Vec<FileFragment>) -> Self {
        Self { fragments }
    }

    /// First fragment defining `key`.
    pub fn lookup(&self, key: &str) -> Option<(&Value, &Path)> {
        self.fragments.iter().find_map(|fragment| {
            fragment
                .values
                .get(key)
                .map(|value| (value, fragment.path.as_path()))
        })
    }

    /// Fragments in priority order.
    pub fn fragments(&self) -> &[FileFragment] {
        &self.fragments
    }

    /// Flattened view honoring first-file-wins.
    pub fn merged(&self) -> BTreeMap<String, Value> {
        let mut merged = BTreeMap::new();
        for fragment in &self.fragments {
            for (key, value) in &fragment.values {
                merged
                    .entry(key.clone())
                    .or_insert_with(|| value.clone());
            }
        }
        merged
    }
}
