//! Error types for directive registration, loading and lookup.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by `LayeredConfig` operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Directive key collides with the files-list environment variable suffix.
    #[error("directive `{0}` conflicts with the config files environment variable name")]
    ConflictingKey(String),
    /// A converter rejected an environment value during load.
    #[error("conversion error for environment variable \"{variable}\"")]
    ConversionFailed {
        variable: String,
        #[source]
        source: ConversionError,
    },
    /// Lookup, override or delete on a key that was never registered.
    #[error("directive not registered: {0}")]
    KeyNotRegistered(String),
    /// Delete on a key without a current override.
    #[error("no override set for directive: {0}")]
    OverrideNotSet(String),
    /// Namespace queries need a non-empty prefix.
    #[error("namespace must not be empty")]
    EmptyNamespace,
    /// Reading a config file or directory failed.
    #[error("failed to read config {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Parsing a config file failed.
    #[error("failed to parse config {}: {source}", path.display())]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: json5::Error,
    },
    /// Config file parsed but is not a key/value document.
    #[error("invalid config {}: {message}", path.display())]
    InvalidFile { path: PathBuf, message: String },
    /// Directory expansion pattern is not a valid glob.
    #[error("invalid expansion pattern: {0}")]
    InvalidPattern(#[from] globset::Error),
    /// Resolved value does not deserialize into the requested type.
    #[error("directive {key} has an unexpected type: {source}")]
    TypeMismatch {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure raised by a converter for a single raw value.
#[derive(Debug, Error)]
#[error("{converter} converter rejected {input:?}: {message}")]
pub struct ConversionError {
    /// Name of the converter that failed.
    pub converter: String,
    /// Raw input handed to the converter.
    pub input: String,
    /// Human readable reason.
    pub message: String,
}

impl ConversionError {
    /// Build a conversion error for the given converter and input.
    pub fn new(
        converter: impl Into<String>,
        input: impl Into<String>,
        message: impl ToString,
    ) -> Self {
        Self {
            converter: converter.into(),
            input: input.into(),
            message: message.to_string(),
        }
    }
}
