//! History statistics command

use clap::{ArgMatches, Command};
use schema_tuner::{HistoryLedger, HistorySummary};

use super::effective_config;
use crate::cli::utils::{
    bullet_preview, format_seconds, print_header, print_info, title_case, CliResult, JsonOutput,
    CATEGORY_PREVIEW,
};
use crate::cli::GlobalOptions;

/// Build the 'stats' subcommand
pub fn stats_command() -> Command {
    Command::new("stats").about("Summarize the fine-tuning history")
}

/// Execute the 'stats' command
pub fn run_stats(matches: &ArgMatches) -> CliResult<()> {
    let global = GlobalOptions::from_matches(matches);
    let config = effective_config(&global)?;
    let ledger = HistoryLedger::new(config.history_path);
    render_history(&global, &ledger)
}

/// Print the summary of `ledger` in the selected output format
pub fn render_history(global: &GlobalOptions, ledger: &HistoryLedger) -> CliResult<()> {
    let summary = HistorySummary::from_records(&ledger.load());

    if global.is_json() {
        let mut output = JsonOutput::new();
        output.status(true);
        output.add_str("operation", "stats");
        output.add_str("history", &ledger.path().display().to_string());
        output.add_value("summary", &summary);
        output.print();
        return Ok(());
    }

    if summary.is_empty() {
        print_info("No fine-tuning history found");
        return Ok(());
    }

    for line in summary_lines(&summary) {
        println!("{}", line);
    }
    for (category, improvements) in &summary.categories {
        print_header(&format!(
            "{} Improvements ({})",
            title_case(category.as_str()),
            improvements.len()
        ));
        for line in bullet_preview(improvements, CATEGORY_PREVIEW) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn summary_lines(summary: &HistorySummary) -> Vec<String> {
    vec![
        "\n=== Fine-Tuning Statistics ===".to_string(),
        format!("Total tables fine-tuned: {}", summary.total_tables),
        format!("Total improvements made: {}", summary.total_improvements),
        format!(
            "Average execution time: {}",
            format_seconds(summary.average_execution_time)
        ),
    ]
}
