//! Layered configuration resolution.
//!
//! This crate owns directive registration, the override/environment/file/
//! default layer stack, environment value conversion and config file
//! loading with directory expansion.

mod config;
mod converter;
mod env;
mod error;
mod layer;
mod loader;
mod registry;

/// The layered container and namespace query options.
pub use config::{LayeredConfig, NamespaceOptions};
/// Environment value converters.
pub use converter::{Converter, bool_like, to_json};
/// Environment variable sources.
pub use env::{EnvSource, MapEnv, ProcessEnv};
/// Public error types returned by registration, load and lookup.
pub use error::{ConfigError, ConversionError};
/// Layer metadata.
pub use layer::{FileFragment, FileLayer, LayerSource, Resolution};
/// Loader options and defaults.
pub use loader::{
    DEFAULT_ENV_PREFIX, DEFAULT_EXPANSION_PATTERN, DEFAULT_FILES_ENV_VAR, LayeredConfigOptions,
};
/// Registry types.
pub use registry::{ConfigWarning, Directive};

/// Re-export so callers can build values without naming serde_json.
pub use serde_json::{Value, json};
