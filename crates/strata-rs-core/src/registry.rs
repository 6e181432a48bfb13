//! Directive registry: key to converter and default value.

use crate::Converter;
use log::debug;
use serde_json::Value;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

/// Registered directive.
#[derive(Debug, Clone)]
pub struct Directive {
    /// Converter applied to environment values.
    pub converter: Converter,
    /// Default layer value.
    pub default: Value,
}

/// Non-fatal condition noticed while configuring the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Name contains characters outside `[A-Z0-9_]`.
    UnsafeName(String),
    /// Directive registered with the naive truthiness converter.
    TruthyConverter(String),
    /// Directive differs from an existing key only by letter case.
    DuplicateKeyCasing { key: String, existing: String },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::UnsafeName(name) => {
                write!(f, "name \"{name}\" is unsafe for use in environment variables")
            }
            ConfigWarning::TruthyConverter(key) => write!(
                f,
                "directive {key} uses the truthy converter, which treats every non-empty \
                 string as true; use bool_like instead"
            ),
            ConfigWarning::DuplicateKeyCasing { key, existing } => write!(
                f,
                "directive {key} differs from registered directive {existing} only by case"
            ),
        }
    }
}

/// Ordered set of registered directives.
#[derive(Debug, Default, Clone)]
pub(crate) struct Registry {
    directives: BTreeMap<String, Directive>,
}

impl Registry {
    /// Insert or replace a directive, returning the warnings it raised.
    pub(crate) fn insert(&mut self, key: &str, directive: Directive) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        if let Some(warning) = check_safe_env_name(key) {
            warnings.push(warning);
        }
        if directive.converter.is_truthy() {
            warnings.push(ConfigWarning::TruthyConverter(key.to_string()));
        }
        for existing in self.directives.keys() {
            if existing != key && existing.eq_ignore_ascii_case(key) {
                warnings.push(ConfigWarning::DuplicateKeyCasing {
                    key: key.to_string(),
                    existing: existing.clone(),
                });
            }
        }

        debug!(
            "registering directive (key={}, converter={})",
            key,
            directive.converter.name()
        );
        self.directives.insert(key.to_string(), directive);
        warnings
    }

    pub(crate) fn get(&self, key: &str) -> Option<&Directive> {
        self.directives.get(key)
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.directives.contains_key(key)
    }

    pub(crate) fn keys(&self) -> btree_map::Keys<'_, String, Directive> {
        self.directives.keys()
    }

    pub(crate) fn len(&self) -> usize {
        self.directives.len()
    }
}

/// Characters considered safe for environment variable names.
fn is_safe_env_char(ch: char) -> bool {
    ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '_'
}

/// Warn when a name would be awkward to set from a shell.
pub(crate) fn check_safe_env_name(name: &str) -> Option<ConfigWarning> {
    if name.chars().all(is_safe_env_char) {
        return None;
    }
    Some(ConfigWarning::UnsafeName(name.to_string()))
}
