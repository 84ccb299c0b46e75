//! schema-tuner CLI
//!
//! # Output Formats
//!
//! The CLI supports two output formats:
//! - `text` (default): Human-readable output with formatting
//! - `json`: Machine-readable JSON output for scripting and automation
//!
//! Use the `--format` or `-o` flag to specify the format.
//! Use `--quiet` or `-q` to suppress informational messages.
//!
//! # Configuration
//!
//! Defaults, then `--config <file>`, then `SCHEMA_TUNER_*` environment
//! variables, then `--database`/`--history` and per-command flags.

pub mod commands;
pub mod utils;

use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;
use tracing::Level;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {}. Use 'text' or 'json'.", s)),
        }
    }
}

/// Global CLI options that apply to all commands
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
    pub config: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub history: Option<PathBuf>,
}

impl GlobalOptions {
    /// Extract global options from argument matches
    pub fn from_matches(matches: &clap::ArgMatches) -> Self {
        let output_format = matches
            .get_one::<String>("format")
            .map(|s| s.parse().unwrap_or_default())
            .unwrap_or_default();

        GlobalOptions {
            output_format,
            quiet: matches.get_flag("quiet"),
            verbose: matches.get_flag("verbose"),
            config: matches.get_one::<PathBuf>("config").cloned(),
            database: matches.get_one::<PathBuf>("database").cloned(),
            history: matches.get_one::<PathBuf>("history").cloned(),
        }
    }

    /// Check if output should be JSON
    pub fn is_json(&self) -> bool {
        self.output_format == OutputFormat::Json
    }

    /// Log level implied by `--verbose` / `--quiet`
    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else if self.quiet {
            Level::WARN
        } else {
            Level::INFO
        }
    }
}

/// Build the CLI command structure
pub fn build_cli() -> Command {
    Command::new("schema-tuner")
        .about("Schema fine-tuning advisor for SQLite databases")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        // Global options
        .arg(
            Arg::new("format")
                .help("Output format: text (default) or json")
                .short('o')
                .long("format")
                .global(true)
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .arg(
            Arg::new("quiet")
                .help("Suppress informational output (errors still shown)")
                .short('q')
                .long("quiet")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .help("Log every step of each table pass")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .conflicts_with("quiet"),
        )
        .arg(
            Arg::new("config")
                .help("JSON configuration file")
                .short('c')
                .long("config")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("database")
                .help("SQLite database file")
                .short('d')
                .long("database")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("history")
                .help("Fine-tuning history file")
                .long("history")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .subcommand(commands::tune::tune_command())
        .subcommand(commands::stats::stats_command())
        .subcommand(commands::config::config_command())
}

/// Dispatch to appropriate command handler
pub fn run(matches: clap::ArgMatches) -> utils::CliResult<()> {
    match matches.subcommand() {
        Some(("tune", sub)) => commands::tune::run_tune(sub),
        Some(("stats", sub)) => commands::stats::run_stats(sub),
        Some(("config", sub)) => commands::config::run_config(sub),
        _ => Err(utils::CliError::Validation(
            "Unknown command. Use --help for available commands.".into(),
        )
        .into()),
    }
}
