//! Tests for the `strata` command runner.

use clap::Parser;
use pretty_assertions::assert_eq;
use strata_rs::cli::{self, Cli};
use strata_rs::{Value, json};
use strata_rs_test_utils::{ConfigTree, env_snapshot};

fn run(args: &[&str], env: &[(&str, &str)]) -> anyhow::Result<Value> {
    strata_rs::init_logging();
    let cli = Cli::try_parse_from(std::iter::once("strata").chain(args.iter().copied()))?;
    let mut out = Vec::new();
    cli::run(&cli, env_snapshot(env), &mut out)?;
    Ok(serde_json::from_slice(&out)?)
}

/// `show` prints every directive after layering.
#[test]
fn show_prints_resolved_mapping() {
    let tree = ConfigTree::new();
    let file = tree.write("conf.d/app.cnf.json5", "{ HOST: \"file\" }");
    let dir = file.parent().expect("dir").display().to_string();

    let output = run(
        &[
            "-d", "HOST=\"default\"",
            "-d", "PORT:int=8080",
            "-d", "DEBUG:bool=false",
            "-f", &dir,
            "show",
        ],
        &[("APP_PORT", "9000"), ("APP_DEBUG", "yes")],
    )
    .expect("run");

    assert_eq!(
        output,
        json!({"DEBUG": true, "HOST": "file", "PORT": 9000})
    );
}

/// `explain` reports the winning layer.
#[test]
fn explain_reports_source() {
    let output = run(
        &["--prefix", "", "-d", "HOST=\"default\"", "explain", "HOST"],
        &[("HOST", "env")],
    )
    .expect("run");

    assert_eq!(
        output,
        json!({"key": "HOST", "value": "env", "source": "environment", "path": null})
    );
}

/// `namespace` slices by prefix.
#[test]
fn namespace_slices_keys() {
    let output = run(
        &[
            "-d", "DB_HOST=\"db\"",
            "-d", "DB_PORT:int=5432",
            "-d", "CACHE_TTL:int=60",
            "namespace", "DB_",
        ],
        &[],
    )
    .expect("run");

    assert_eq!(output, json!({"host": "db", "port": 5432}));
}

/// Conversion failures surface as errors.
#[test]
fn conversion_failure_is_an_error() {
    let err = run(&["-d", "PORT:int=1", "get", "PORT"], &[("APP_PORT", "abc")]).unwrap_err();
    assert!(format!("{err:#}").contains("APP_PORT"));
}

/// Unknown keys surface as errors.
#[test]
fn get_unknown_key_fails() {
    assert!(run(&["-d", "HOST", "get", "PORT"], &[]).is_err());
}
