//! Command-line interface for solution-templatize.
//!
//! # Commands
//!
//! - `templatize` - Rewrite field references in item data into placeholders
//! - `resolve` - Replace placeholders with values from a settings dictionary
//! - `references` - Report which dashboard objects use which datasources
//!
//! # Global Options
//!
//! - `--verbose` / `-v` - Debug logging
//! - `--quiet` / `-q` - No logging
//! - `--config` / `-c` - Path to a custom config file
//!
//! `RUST_LOG`, when set, takes precedence over both verbosity flags and the
//! `log_level` config value. Logs go to stderr so stdout stays valid JSON.
//!
//! # Examples
//!
//! ```bash
//! # Templatize a dashboard against its datasource catalog
//! solution-templatize templatize dashboard.json --catalog catalog.json --kind dashboard
//!
//! # Turn the template back into concrete field names
//! solution-templatize resolve template.json --catalog catalog.json --strict
//! ```

mod common;
mod references;
mod resolve;
mod templatize;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;

/// How much the binary logs, as chosen on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

/// Runtime configuration derived from the global flags.
///
/// Kept separate from [`Cli`] so tests and library callers can drive command
/// execution without parsing arguments.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub verbosity: Verbosity,

    /// Config file to load instead of the default location.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    #[must_use]
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Tracing filter for this run, or `None` when logging is off.
    ///
    /// `--verbose` means `debug`; otherwise the config's `log_level` applies,
    /// falling back to `info`.
    #[must_use]
    pub fn log_filter(&self, settings: &Settings) -> Option<String> {
        match self.verbosity {
            Verbosity::Quiet => None,
            Verbosity::Verbose => Some("debug".to_string()),
            Verbosity::Normal => {
                Some(settings.log_level.clone().unwrap_or_else(|| "info".to_string()))
            }
        }
    }

    /// Install the global tracing subscriber. Later calls are no-ops.
    pub fn init_logging(&self, settings: &Settings) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            match self.log_filter(settings) {
                Some(level) => EnvFilter::new(level),
                None => return,
            }
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Templatize ArcGIS solution item data.
#[derive(Parser)]
#[command(
    name = "solution-templatize",
    about = "Templatize field references in ArcGIS dashboards and web applications",
    version,
    author,
    long_about = "Rewrites literal feature layer field names found in item data into placeholders \
                  bound to the layer that owns them, and resolves such placeholders back."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Disable logging
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a custom config file
    #[arg(short, long, global = true, env = "SOLUTION_TEMPLATIZE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite field references in item data into placeholders
    Templatize(templatize::TemplatizeCommand),

    /// Replace placeholders with values from a settings dictionary
    Resolve(resolve::ResolveCommand),

    /// Report which dashboard objects reference which datasources
    References(references::ReferencesCommand),
}

impl Cli {
    /// Execute the parsed command with configuration from the global flags.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let verbosity = if self.verbose {
            Verbosity::Verbose
        } else if self.quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        };

        CliConfig {
            verbosity,
            config_path: self.config.clone(),
        }
    }

    /// Execute the parsed command with an explicit configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let settings = Settings::load_with_optional(config.config_path.clone()).await?;
        config.init_logging(&settings);
        tracing::debug!("Using settings {:?}", settings);

        match self.command {
            Commands::Templatize(cmd) => cmd.execute(&settings).await,
            Commands::Resolve(cmd) => cmd.execute(&settings).await,
            Commands::References(cmd) => cmd.execute().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_config_verbosity() {
        let cli = Cli::try_parse_from(["solution-templatize", "-v", "references", "d.json", "--catalog", "c.json"])
            .unwrap();
        assert_eq!(cli.build_config().verbosity, Verbosity::Verbose);

        let cli = Cli::try_parse_from(["solution-templatize", "references", "d.json", "--catalog", "c.json", "-q"])
            .unwrap();
        assert_eq!(cli.build_config().verbosity, Verbosity::Quiet);
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        let result = Cli::try_parse_from([
            "solution-templatize",
            "-v",
            "-q",
            "references",
            "d.json",
            "--catalog",
            "c.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_path_flag() {
        let cli = Cli::try_parse_from([
            "solution-templatize",
            "--config",
            "/tmp/custom.toml",
            "references",
            "d.json",
            "--catalog",
            "c.json",
        ])
        .unwrap();
        assert_eq!(cli.build_config().config_path, Some(PathBuf::from("/tmp/custom.toml")));
    }

    #[test]
    fn test_log_filter() {
        let settings = Settings {
            log_level: Some("trace".to_string()),
            ..Settings::default()
        };

        assert_eq!(CliConfig::new().log_filter(&settings).as_deref(), Some("trace"));
        assert_eq!(CliConfig::new().log_filter(&Settings::default()).as_deref(), Some("info"));
        assert_eq!(
            CliConfig::new().with_verbosity(Verbosity::Verbose).log_filter(&settings).as_deref(),
            Some("debug")
        );
        assert!(CliConfig::new().with_verbosity(Verbosity::Quiet).log_filter(&settings).is_none());
    }

    #[test]
    fn test_cli_config_builder() {
        let config = CliConfig::new().with_config_path("/x/config.toml");
        assert_eq!(config.config_path, Some(PathBuf::from("/x/config.toml")));
        assert_eq!(config.verbosity, Verbosity::Normal);
    }
}
