//! Environment variable sources consulted during load.

use std::collections::BTreeMap;

/// Provider of environment variables for the environment phase.
///
/// Load takes a single snapshot per call and uses it for both the
/// directive scan and the files-list variable.
pub trait EnvSource: Send + Sync {
    /// Return every variable as `(name, value)` pairs.
    fn snapshot(&self) -> BTreeMap<String, String>;
}

/// Reads the real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn snapshot(&self) -> BTreeMap<String, String> {
        // Non-UTF-8 names or values cannot match a directive key.
        std::env::vars_os()
            .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
            .collect()
    }
}

/// Owned, fixed set of variables.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MapEnv {
    vars: BTreeMap<String, String>,
}

impl MapEnv {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a variable.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Add or replace a variable in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Remove a variable.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.vars.remove(name)
    }
}

impl<K, V> FromIterator<(K, V)> for MapEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl EnvSource for MapEnv {
    fn snapshot(&self) -> BTreeMap<String, String> {
        self.vars.clone()
    }
}
