//! `strata` binary: print layered configuration resolved from the environment and files.

use anyhow::Context;
use clap::Parser;
use log::info;
use std::io;
use strata_rs::ProcessEnv;
use strata_rs::cli::{self, Cli};

fn main() -> anyhow::Result<()> {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();

    let cli = Cli::parse();
    info!(
        "starting strata (directives={}, files={}, prefix={:?})",
        cli.directives.len(),
        cli.files.len(),
        cli.prefix
    );
    let stdout = io::stdout();
    let mut out = stdout.lock();
    cli::run(&cli, ProcessEnv, &mut out).context("strata failed")
}
