use strata_rs_core::MapEnv;

/// Build a fixed environment from name/value pairs.
pub fn env_snapshot(vars: &[(&str, &str)]) -> MapEnv {
    vars.iter().copied().collect()
}
