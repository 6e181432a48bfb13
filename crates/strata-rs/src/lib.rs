//! Public SDK surface for Strata.
//!
//! This crate re-exports the layered configuration engine and provides a
//! small initialization helper to keep consumer setup consistent.

/// Re-export for convenience.
pub use strata_rs_core as core;
pub use strata_rs_core::{
    ConfigError, ConfigWarning, Converter, EnvSource, LayerSource, LayeredConfig,
    LayeredConfigOptions, MapEnv, NamespaceOptions, ProcessEnv, Resolution, Value, json,
};

pub mod cli;

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled. Binaries are still expected
/// to call this early in startup to ensure log output is wired up.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}
