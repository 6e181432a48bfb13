//! IO helpers for reading config files from disk.

use crate::layer::FileFragment;
use crate::registry::Registry;
use crate::ConfigError;
use log::debug;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Parse one config file into a fragment holding registered keys only.
pub(super) fn load_file(path: &Path, registry: &Registry) -> Result<FileFragment, ConfigError> {
    debug!("loading config file (path={})", path.display());
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    parse_fragment(path, &contents, registry)
}

/// Parse JSON5 contents; each top-level member assigns one directive.
pub(super) fn parse_fragment(
    path: &Path,
    contents: &str,
    registry: &Registry,
) -> Result<FileFragment, ConfigError> {
    let value: Value = json5::from_str(contents).map_err(|source| ConfigError::ParseFailed {
        path: path.to_path_buf(),
        source,
    })?;
    let members = match value {
        Value::Object(members) => members,
        other => {
            return Err(ConfigError::InvalidFile {
                path: path.to_path_buf(),
                message: format!("expected an object of directives, found {}", kind(&other)),
            });
        }
    };

    let total = members.len();
    let values: serde_json::Map<String, Value> = members
        .into_iter()
        .filter(|(key, _)| registry.contains(key))
        .collect();
    debug!(
        "config file parsed (path={}, directives={}, ignored={})",
        path.display(),
        values.len(),
        total - values.len()
    );
    Ok(FileFragment {
        path: path.to_path_buf(),
        values,
    })
}

/// Short name of a JSON value kind for error messages.
fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
