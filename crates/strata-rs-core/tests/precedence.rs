//! Tests for layer precedence across override, environment, file and default.

use pretty_assertions::assert_eq;
use strata_rs_core::{
    ConfigError, Converter, LayerSource, LayeredConfig, LayeredConfigOptions, MapEnv, json,
};
use strata_rs_test_utils::{ConfigTree, env_snapshot};

fn config_with(tree: &ConfigTree, env: MapEnv) -> LayeredConfig {
    let file = tree.write("app.cnf.json5", "{ HOST: \"file\", PORT: 7000 }");
    let options = LayeredConfigOptions::new().with_path(file);
    let mut config = LayeredConfig::with_env(options, env).expect("config");
    config
        .register("HOST", Converter::string(), "default")
        .expect("host");
    config
        .register("PORT", Converter::integer(), 8080)
        .expect("port");
    config
        .register("DEBUG", Converter::bool_like(), false)
        .expect("debug");
    config
}

/// Keys with no other layer value resolve to their defaults.
#[test]
fn default_layer_is_the_fallback() {
    let tree = ConfigTree::new();
    let mut config = config_with(&tree, MapEnv::new());

    assert_eq!(config.get("DEBUG").expect("debug"), &json!(false));
    let resolution = config.explain("DEBUG").expect("explain");
    assert_eq!(resolution.source, LayerSource::Default);
    assert_eq!(resolution.path, None);
}

/// File values beat defaults.
#[test]
fn file_beats_default() {
    let tree = ConfigTree::new();
    let mut config = config_with(&tree, MapEnv::new());

    assert_eq!(config.get("PORT").expect("port"), &json!(7000));
    let resolution = config.explain("PORT").expect("explain");
    assert_eq!(resolution.source, LayerSource::File);
    assert_eq!(resolution.path, Some(tree.path("app.cnf.json5")));
}

/// Environment values beat file values.
#[test]
fn environment_beats_file() {
    let tree = ConfigTree::new();
    let mut config = config_with(&tree, env_snapshot(&[("APP_HOST", "env")]));

    assert_eq!(config.get("HOST").expect("host"), &json!("env"));
    assert_eq!(
        config.explain("HOST").expect("explain").source,
        LayerSource::Environment
    );
}

/// Overrides beat everything until deleted.
#[test]
fn override_beats_environment_until_deleted() {
    let tree = ConfigTree::new();
    let mut config = config_with(&tree, env_snapshot(&[("APP_HOST", "env")]));

    config.set("HOST", "override").expect("set");
    assert_eq!(config.get("HOST").expect("host"), &json!("override"));
    config.load().expect("reload");
    assert_eq!(config.get("HOST").expect("host"), &json!("override"));

    config.delete("HOST").expect("delete");
    assert_eq!(config.get("HOST").expect("host"), &json!("env"));
}

/// Unregistered lookups fail before and after load.
#[test]
fn unregistered_lookup_fails_before_and_after_load() {
    let tree = ConfigTree::new();
    let mut config = config_with(&tree, MapEnv::new());
    config.set_autoload(false);

    assert!(matches!(
        config.get("MISSING"),
        Err(ConfigError::KeyNotRegistered(key)) if key == "MISSING"
    ));
    config.load().expect("load");
    assert!(matches!(
        config.get("MISSING"),
        Err(ConfigError::KeyNotRegistered(_))
    ));
}

/// Loading twice with unchanged inputs yields the same resolution.
#[test]
fn load_is_idempotent() {
    let tree = ConfigTree::new();
    let mut config = config_with(&tree, env_snapshot(&[("APP_DEBUG", "on")]));

    config.load().expect("first load");
    let first = config.resolved().expect("first");
    config.load().expect("second load");
    let second = config.resolved().expect("second");

    assert_eq!(first, second);
    assert_eq!(first.get("DEBUG"), Some(&json!(true)));
    assert_eq!(first.get("HOST"), Some(&json!("file")));
}

/// Re-registering a directive makes the next access reload the layers.
#[test]
fn registration_triggers_reload_on_next_access() {
    let tree = ConfigTree::new();
    let mut config = config_with(&tree, env_snapshot(&[("APP_LEVEL", "3")]));
    assert_eq!(config.get("HOST").expect("host"), &json!("file"));

    config
        .register("LEVEL", Converter::integer(), 0)
        .expect("level");
    assert!(!config.is_loaded());
    assert_eq!(config.get("LEVEL").expect("level"), &json!(3));
}
