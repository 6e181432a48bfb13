//! Load pipeline for the environment and file layers.
//!
//! Each load takes one environment snapshot, converts prefixed variables for
//! registered directives, then resolves the config file list (files-list
//! variable first, explicit paths after), expands directories and parses
//! every file into a fragment of the file layer.

mod layer_io;
mod utils;


use crate::env::EnvSource;
use crate::layer::FileLayer;
use crate::registry::Registry;
use crate::ConfigError;
use globset::{Glob, GlobMatcher};
use log::{debug, info};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default prefix for directive environment variables.
pub const DEFAULT_ENV_PREFIX: &str = "APP_";
/// Default suffix of the variable listing extra config files.
pub const DEFAULT_FILES_ENV_VAR: &str = "CONFIG";
/// Default pattern used when a directory is given instead of a file.
pub const DEFAULT_EXPANSION_PATTERN: &str = "*.cnf.json5";

/// Options controlling where layers are loaded from.
#[derive(Debug, Clone)]
pub struct LayeredConfigOptions {
    /// Explicit config files or directories, loaded after the files-list variable.
    pub paths: Vec<PathBuf>,
    /// Prefix of every directive variable; empty disables prefixing.
    pub env_prefix: String,
    /// Suffix of the colon-delimited files-list variable; `None` disables it.
    pub files_env_var: Option<String>,
    /// Glob matched against file names when expanding a directory.
    pub expansion_pattern: String,
    /// Load on first access when not loaded yet.
    pub autoload: bool,
}

impl Default for LayeredConfigOptions {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            files_env_var: Some(DEFAULT_FILES_ENV_VAR.to_string()),
            expansion_pattern: DEFAULT_EXPANSION_PATTERN.to_string(),
            autoload: true,
        }
    }
}

impl LayeredConfigOptions {
    /// Create options with the default prefix, files variable and pattern.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an explicit config file or directory.
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Replace the environment variable prefix.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Replace or disable the files-list variable suffix.
    pub fn files_env_var(mut self, suffix: Option<&str>) -> Self {
        self.files_env_var = suffix.map(str::to_string);
        self
    }

    /// Replace the directory expansion glob.
    pub fn expansion_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.expansion_pattern = pattern.into();
        self
    }

    /// Toggle loading on first access.
    pub fn autoload(mut self, autoload: bool) -> Self {
        self.autoload = autoload;
        self
    }

    /// Full name of the files-list variable, when enabled.
    pub fn files_env_var_name(&self) -> Option<String> {
        self.files_env_var
            .as_deref()
            .filter(|suffix| !suffix.is_empty())
            .map(|suffix| format!("{}{}", self.env_prefix, suffix))
    }

    pub(crate) fn compile_pattern(&self) -> Result<GlobMatcher, ConfigError> {
        Ok(Glob::new(&self.expansion_pattern)?.compile_matcher())
    }
}

/// Freshly loaded environment and file layers.
#[derive(Debug, Default)]
pub(crate) struct LoadedLayers {
    pub(crate) env: BTreeMap<String, Value>,
    pub(crate) files: FileLayer,
}

/// Run both load phases against a single environment snapshot.
pub(crate) fn load_layers(
    options: &LayeredConfigOptions,
    matcher: &GlobMatcher,
    registry: &Registry,
    env: &dyn EnvSource,
) -> Result<LoadedLayers, ConfigError> {
    let vars = env.snapshot();
    debug!("environment snapshot taken (vars={})", vars.len());
    let env = load_env_layer(&options.env_prefix, registry, &vars)?;
    let files = load_file_layer(options, matcher, registry, &vars)?;
    Ok(LoadedLayers { env, files })
}

/// Convert prefixed variables that name registered directives.
fn load_env_layer(
    prefix: &str,
    registry: &Registry,
    vars: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, Value>, ConfigError> {
    debug!("loading env vars (prefix={prefix:?})");
    let mut layer = BTreeMap::new();
    for (name, raw) in vars {
        let Some(key) = name.strip_prefix(prefix) else {
            continue;
        };
        let Some(directive) = registry.get(key) else {
            continue;
        };
        let value =
            directive
                .converter
                .convert(raw)
                .map_err(|source| ConfigError::ConversionFailed {
                    variable: name.clone(),
                    source,
                })?;
        debug!(
            "env var converted (variable={}, converter={})",
            name,
            directive.converter.name()
        );
        layer.insert(key.to_string(), value);
    }
    info!("env vars loaded (count={})", layer.len());
    Ok(layer)
}

/// Resolve, expand and parse every config file.
fn load_file_layer(
    options: &LayeredConfigOptions,
    matcher: &GlobMatcher,
    registry: &Registry,
    vars: &BTreeMap<String, String>,
) -> Result<FileLayer, ConfigError> {
    debug!("loading config files");
    let mut paths = Vec::new();
    if let Some(name) = options.files_env_var_name() {
        debug!("reading config file list from env var (name={name})");
        if let Some(list) = vars.get(&name) {
            paths.extend(utils::split_path_list(list));
        }
    }
    paths.extend(options.paths.iter().cloned());

    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(utils::expand_dir(&path, matcher)?);
        } else {
            files.push(path);
        }
    }
    debug!("config files to load: {files:?}");

    let fragments = files
        .iter()
        .map(|file| layer_io::load_file(file, registry))
        .collect::<Result<Vec<_>, _>>()?;
    info!("config files loaded (count={})", fragments.len());
    Ok(FileLayer::new(fragments))
}
