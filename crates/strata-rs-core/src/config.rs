//! The `LayeredConfig` container.

use crate::env::{EnvSource, ProcessEnv};
use crate::layer::{FileLayer, LayerSource, Resolution};
use crate::loader::{self, LayeredConfigOptions, LoadedLayers};
use crate::registry::{self, ConfigWarning, Directive, Registry};
use crate::{ConfigError, Converter};
use globset::GlobMatcher;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Options for [`LayeredConfig::namespace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamespaceOptions {
    /// Strip the namespace prefix from returned keys.
    pub trim: bool,
    /// Lowercase returned keys.
    pub lowercase: bool,
}

impl Default for NamespaceOptions {
    fn default() -> Self {
        Self {
            trim: true,
            lowercase: true,
        }
    }
}

/// Configuration directives resolved across four layers.
///
/// Precedence (high -> low): override, environment, file, default. The
/// keyspace is always the set of registered directives; layers only decide
/// which value a key resolves to.
pub struct LayeredConfig {
    options: LayeredConfigOptions,
    matcher: GlobMatcher,
    env: Box<dyn EnvSource>,
    registry: Registry,
    loaded: bool,
    override_layer: BTreeMap<String, Value>,
    env_layer: BTreeMap<String, Value>,
    file_layer: FileLayer,
    warnings: Vec<ConfigWarning>,
}

impl LayeredConfig {
    /// Create a container reading the process environment.
    pub fn new(options: LayeredConfigOptions) -> Result<Self, ConfigError> {
        Self::with_env(options, ProcessEnv)
    }

    /// Create a container reading variables from `env`.
    pub fn with_env(
        options: LayeredConfigOptions,
        env: impl EnvSource + 'static,
    ) -> Result<Self, ConfigError> {
        let matcher = options.compile_pattern()?;
        let mut config = Self {
            matcher,
            env: Box::new(env),
            registry: Registry::default(),
            loaded: false,
            override_layer: BTreeMap::new(),
            env_layer: BTreeMap::new(),
            file_layer: FileLayer::default(),
            warnings: Vec::new(),
            options,
        };

        let mut warnings: Vec<_> = registry::check_safe_env_name(&config.options.env_prefix)
            .into_iter()
            .collect();
        if let Some(suffix) = config.options.files_env_var.as_deref() {
            warnings.extend(registry::check_safe_env_name(suffix));
        }
        config.record_warnings(warnings);
        debug!(
            "layered config created (prefix={:?}, files_env_var={:?}, paths={})",
            config.options.env_prefix,
            config.options.files_env_var,
            config.options.paths.len()
        );
        Ok(config)
    }

    /// Options the container was built with.
    pub fn options(&self) -> &LayeredConfigOptions {
        &self.options
    }

    /// Swap the environment source; the next access reloads.
    pub fn replace_env(&mut self, env: impl EnvSource + 'static) {
        self.env = Box::new(env);
        self.loaded = false;
    }

    /// Toggle loading on first access.
    pub fn set_autoload(&mut self, autoload: bool) {
        self.options.autoload = autoload;
    }

    /// Register or replace a directive.
    ///
    /// The key is used verbatim in environment variable names and config
    /// files. Registration invalidates previously loaded layers.
    pub fn register(
        &mut self,
        key: &str,
        converter: Converter,
        default: impl Into<Value>,
    ) -> Result<(), ConfigError> {
        if self.options.files_env_var.as_deref() == Some(key) {
            return Err(ConfigError::ConflictingKey(key.to_string()));
        }

        let warnings = self.registry.insert(
            key,
            Directive {
                converter,
                default: default.into(),
            },
        );
        self.record_warnings(warnings);
        self.loaded = false;
        Ok(())
    }

    /// Load the environment and file layers.
    ///
    /// Both layers are replaced wholesale. On error the previous layers stay
    /// in place and the container remains unloaded, so the next access
    /// retries from scratch.
    pub fn load(&mut self) -> Result<(), ConfigError> {
        self.loaded = false;
        let LoadedLayers { env, files } = loader::load_layers(
            &self.options,
            &self.matcher,
            &self.registry,
            &*self.env,
        )?;
        self.env_layer = env;
        self.file_layer = files;
        self.loaded = true;
        info!(
            "config loaded (directives={}, env={}, files={})",
            self.registry.len(),
            self.env_layer.len(),
            self.file_layer.fragments().len()
        );
        Ok(())
    }

    /// Whether layers are loaded and current with the registry.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Resolve a directive value.
    pub fn get(&mut self, key: &str) -> Result<&Value, ConfigError> {
        self.ensure_loaded()?;
        self.lookup(key)
            .map(|(value, _, _)| value)
            .ok_or_else(|| ConfigError::KeyNotRegistered(key.to_string()))
    }

    /// Resolve a directive and deserialize it into `T`.
    pub fn get_as<T: DeserializeOwned>(&mut self, key: &str) -> Result<T, ConfigError> {
        let value = self.get(key)?.clone();
        serde_json::from_value(value).map_err(|source| ConfigError::TypeMismatch {
            key: key.to_string(),
            source,
        })
    }

    /// Resolve a directive and report which layer supplied it.
    pub fn explain(&mut self, key: &str) -> Result<Resolution, ConfigError> {
        self.ensure_loaded()?;
        self.lookup(key)
            .map(|(value, source, path)| Resolution {
                value: value.clone(),
                source,
                path: path.map(Path::to_path_buf),
            })
            .ok_or_else(|| ConfigError::KeyNotRegistered(key.to_string()))
    }

    /// Override a directive at runtime, returning the previous override.
    ///
    /// The value is stored as given; no converter runs.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<Option<Value>, ConfigError> {
        if !self.registry.contains(key) {
            return Err(ConfigError::KeyNotRegistered(key.to_string()));
        }
        debug!("override set (key={key})");
        Ok(self.override_layer.insert(key.to_string(), value.into()))
    }

    /// Remove a runtime override, returning its value.
    pub fn delete(&mut self, key: &str) -> Result<Value, ConfigError> {
        if !self.registry.contains(key) {
            return Err(ConfigError::KeyNotRegistered(key.to_string()));
        }
        let removed = self
            .override_layer
            .remove(key)
            .ok_or_else(|| ConfigError::OverrideNotSet(key.to_string()))?;
        debug!("override removed (key={key})");
        Ok(removed)
    }

    /// Registered directive for `key`.
    pub fn directive(&self, key: &str) -> Option<&Directive> {
        self.registry.get(key)
    }

    /// Whether `key` is a registered directive.
    pub fn contains_key(&self, key: &str) -> bool {
        self.registry.contains(key)
    }

    /// Registered directive keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.registry.keys().map(String::as_str)
    }

    /// Number of registered directives.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether no directive is registered.
    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }

    /// Resolved values of every directive whose key starts with `namespace`.
    pub fn namespace(
        &mut self,
        namespace: &str,
        options: NamespaceOptions,
    ) -> Result<BTreeMap<String, Value>, ConfigError> {
        if namespace.is_empty() {
            return Err(ConfigError::EmptyNamespace);
        }
        self.ensure_loaded()?;

        let mut slice = BTreeMap::new();
        for (key, value) in self.snapshot() {
            let Some(rest) = key.strip_prefix(namespace) else {
                continue;
            };
            let name = if options.trim { rest } else { key.as_str() };
            let name = if options.lowercase {
                name.to_lowercase()
            } else {
                name.to_string()
            };
            slice.insert(name, value);
        }
        Ok(slice)
    }

    /// Resolved value of every registered directive.
    pub fn resolved(&mut self) -> Result<BTreeMap<String, Value>, ConfigError> {
        self.ensure_loaded()?;
        Ok(self.snapshot())
    }

    /// Warnings recorded since construction.
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    /// Loaded file layer.
    pub fn file_layer(&self) -> &FileLayer {
        &self.file_layer
    }

    fn ensure_loaded(&mut self) -> Result<(), ConfigError> {
        if !self.loaded && self.options.autoload {
            debug!("autoloading config on first access");
            self.load()?;
        }
        Ok(())
    }

    fn lookup(&self, key: &str) -> Option<(&Value, LayerSource, Option<&Path>)> {
        if let Some(value) = self.override_layer.get(key) {
            return Some((value, LayerSource::Override, None));
        }
        if let Some(value) = self.env_layer.get(key) {
            return Some((value, LayerSource::Environment, None));
        }
        if let Some((value, path)) = self.file_layer.lookup(key) {
            return Some((value, LayerSource::File, Some(path)));
        }
        self.registry
            .get(key)
            .map(|directive| (&directive.default, LayerSource::Default, None))
    }

    /// Resolution of every key from the layers currently in memory.
    fn snapshot(&self) -> BTreeMap<String, Value> {
        self.registry
            .keys()
            .filter_map(|key| {
                self.lookup(key)
                    .map(|(value, _, _)| (key.clone(), value.clone()))
            })
            .collect()
    }

    fn record_warnings(&mut self, warnings: Vec<ConfigWarning>) {
        for warning in warnings {
            warn!("{warning}");
            self.warnings.push(warning);
        }
    }
}

impl fmt::Debug for LayeredConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayeredConfig")
            .field("options", &self.options)
            .field("loaded", &self.loaded)
            .field("directives", &self.registry.len())
            .finish_non_exhaustive()
    }
}

/// Renders the currently resolved mapping without triggering a load.
impl fmt::Display for LayeredConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = serde_json::to_string(&self.snapshot()).map_err(|_| fmt::Error)?;
        write!(f, "LayeredConfig {rendered}")
    }
}
