//! Test helpers shared across Strata crates.

pub mod env;
pub mod tree;

pub use env::env_snapshot;
pub use tree::ConfigTree;
