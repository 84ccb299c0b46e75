//! Effective configuration command

use clap::{ArgMatches, Command};

use super::effective_config;
use crate::cli::utils::{CliResult, JsonOutput};
use crate::cli::GlobalOptions;

/// Build the 'config' subcommand
pub fn config_command() -> Command {
    Command::new("config").about("Print the effective configuration after all overrides")
}

/// Execute the 'config' command
pub fn run_config(matches: &ArgMatches) -> CliResult<()> {
    let global = GlobalOptions::from_matches(matches);
    let config = effective_config(&global)?;

    if global.is_json() {
        let mut output = JsonOutput::new();
        output.status(true);
        output.add_str("operation", "config");
        output.add_value("config", &config);
        output.print();
    } else {
        println!("{}", serde_json::to_string_pretty(&config)?);
    }
    Ok(())
}
