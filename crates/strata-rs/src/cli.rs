//! Command-line inspection of a layered configuration.
//!
//! Directives are declared on the command line, layers are loaded from the
//! environment and the given files, and the resolved values are printed as
//! JSON.

use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use log::{debug, info};
use serde_json::{Value, json};
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use strata_rs_core::{
    Converter, DEFAULT_ENV_PREFIX, DEFAULT_EXPANSION_PATTERN, DEFAULT_FILES_ENV_VAR, EnvSource,
    LayeredConfig, LayeredConfigOptions, NamespaceOptions,
};

/// Command-line options for the `strata` binary.
#[derive(Debug, Parser)]
#[command(name = "strata", version, about = "Resolve layered configuration directives")]
pub struct Cli {
    /// Directive declaration: KEY[:CONVERTER][=DEFAULT], DEFAULT is a JSON5 literal
    #[arg(short = 'd', long = "directive", value_name = "SPEC")]
    pub directives: Vec<DirectiveSpec>,
    /// Config file or directory; repeat to add more, earlier files win
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,
    /// Environment variable prefix (empty disables prefixing)
    #[arg(long, default_value = DEFAULT_ENV_PREFIX)]
    pub prefix: String,
    /// Suffix of the colon-delimited config files variable
    #[arg(long, default_value = DEFAULT_FILES_ENV_VAR)]
    pub files_env_var: String,
    /// Ignore the config files variable
    #[arg(long)]
    pub no_files_env_var: bool,
    /// Glob used when a directory is passed as a config file
    #[arg(long, default_value = DEFAULT_EXPANSION_PATTERN)]
    pub pattern: String,
    #[command(subcommand)]
    pub command: Command,
}

/// Inspection commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print every resolved directive
    Show,
    /// Print one resolved directive
    Get { key: String },
    /// Print a directive together with the layer that supplied it
    Explain { key: String },
    /// Print directives whose key starts with PREFIX
    Namespace {
        prefix: String,
        /// Keep the prefix in returned keys
        #[arg(long)]
        keep_prefix: bool,
        /// Keep the original key case
        #[arg(long)]
        keep_case: bool,
    },
}

/// Parsed `KEY[:CONVERTER][=DEFAULT]` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveSpec {
    pub key: String,
    pub converter: String,
    pub default: Value,
}

impl FromStr for DirectiveSpec {
    type Err = anyhow::Error;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let (head, default) = match spec.split_once('=') {
            Some((head, literal)) => {
                let default = json5::from_str::<Value>(literal)
                    .with_context(|| format!("invalid default for directive {head}"))?;
                (head, default)
            }
            None => (spec, Value::Null),
        };
        let (key, converter) = head.split_once(':').unwrap_or((head, "string"));
        if key.is_empty() {
            bail!("directive key must not be empty");
        }
        if Converter::by_name(converter).is_none() {
            bail!("unknown converter {converter} for directive {key}");
        }
        Ok(Self {
            key: key.to_string(),
            converter: converter.to_string(),
            default,
        })
    }
}

impl Cli {
    /// Loader options described by the flags.
    pub fn options(&self) -> LayeredConfigOptions {
        let files_env_var = (!self.no_files_env_var).then_some(self.files_env_var.as_str());
        self.files.iter().fold(
            LayeredConfigOptions::new()
                .env_prefix(self.prefix.as_str())
                .files_env_var(files_env_var)
                .expansion_pattern(self.pattern.as_str()),
            |options, path| options.with_path(path),
        )
    }
}

/// Build a container with every declared directive registered.
pub fn build_config(cli: &Cli, env: impl EnvSource + 'static) -> anyhow::Result<LayeredConfig> {
    let mut config = LayeredConfig::with_env(cli.options(), env).context("invalid options")?;
    for spec in &cli.directives {
        let converter = Converter::by_name(&spec.converter)
            .ok_or_else(|| anyhow!("unknown converter {}", spec.converter))?;
        config
            .register(&spec.key, converter, spec.default.clone())
            .with_context(|| format!("failed to register directive {}", spec.key))?;
    }
    debug!("directives registered (count={})", config.len());
    Ok(config)
}

/// Run a command and write its JSON output.
pub fn run(cli: &Cli, env: impl EnvSource + 'static, out: &mut impl Write) -> anyhow::Result<()> {
    let mut config = build_config(cli, env)?;
    config.load().context("failed to load config")?;
    info!("config resolved (directives={})", config.len());

    let output = match &cli.command {
        Command::Show => serde_json::to_value(config.resolved()?)?,
        Command::Get { key } => config.get(key)?.clone(),
        Command::Explain { key } => {
            let resolution = config.explain(key)?;
            json!({
                "key": key,
                "value": resolution.value,
                "source": resolution.source.to_string(),
                "path": resolution.path.map(|path| path.display().to_string()),
            })
        }
        Command::Namespace {
            prefix,
            keep_prefix,
            keep_case,
        } => {
            let options = NamespaceOptions {
                trim: !keep_prefix,
                lowercase: !keep_case,
            };
            serde_json::to_value(config.namespace(prefix, options)?)?
        }
    };
    serde_json::to_writer_pretty(&mut *out, &output)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn directive_spec_defaults_to_string_converter() {
        let spec: DirectiveSpec = "HOST".parse().expect("spec");
        assert_eq!(
            spec,
            DirectiveSpec {
                key: "HOST".to_string(),
                converter: "string".to_string(),
                default: Value::Null,
            }
        );
    }

    #[test]
    fn directive_spec_parses_converter_and_default() {
        let spec: DirectiveSpec = "HOSTS:json=['a', 'b']".parse().expect("spec");
        assert_eq!(spec.key, "HOSTS");
        assert_eq!(spec.converter, "json");
        assert_eq!(spec.default, json!(["a", "b"]));
    }

    #[test]
    fn directive_spec_rejects_unknown_converter() {
        let err = "PORT:decimal=1".parse::<DirectiveSpec>().unwrap_err();
        assert!(err.to_string().contains("unknown converter decimal"));
    }

    #[test]
    fn directive_spec_rejects_bad_default() {
        assert!("PORT:int={".parse::<DirectiveSpec>().is_err());
        assert!(":int=1".parse::<DirectiveSpec>().is_err());
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "strata",
            "-d",
            "PORT:int=8080",
            "--prefix",
            "",
            "--no-files-env-var",
            "-f",
            "a.json5",
            "get",
            "PORT",
        ])
        .expect("cli");
        let options = cli.options();
        assert_eq!(options.env_prefix, "");
        assert_eq!(options.files_env_var, None);
        assert_eq!(options.paths, vec![PathBuf::from("a.json5")]);
        assert_eq!(cli.directives[0].default, json!(8080));
    }
}
