//! Fine-tuning command

use clap::{Arg, ArgAction, ArgMatches, Command};
use schema_tuner::{BatchReport, Error, FillerPhraseReducer, SchemaTuner, SqlitePool};
use std::sync::Arc;

use super::effective_config;
use super::stats::render_history;
use crate::cli::utils::{
    format_duration, format_seconds, parse_table_list, print_header, print_success,
    print_warning, validate_db_exists, validate_workers, CliError, CliResult, JsonOutput,
};
use crate::cli::GlobalOptions;

/// Build the 'tune' subcommand
pub fn tune_command() -> Command {
    Command::new("tune")
        .about("Analyze tables, create missing indexes and record suggested improvements")
        .arg(
            Arg::new("tables")
                .help("Tables to tune (repeatable or comma-separated); all user tables when omitted")
                .short('t')
                .long("tables")
                .num_args(1..)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("workers")
                .help("Tables processed concurrently")
                .short('w')
                .long("workers")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("show-stats")
                .help("Print the history summary after tuning")
                .long("show-stats")
                .action(ArgAction::SetTrue),
        )
}

/// Execute the 'tune' command
pub fn run_tune(matches: &ArgMatches) -> CliResult<()> {
    let global = GlobalOptions::from_matches(matches);
    let mut config = effective_config(&global)?;

    if let Some(workers) = matches.get_one::<usize>("workers").copied() {
        validate_workers(workers)?;
        config.workers = workers;
    }
    let tables = match matches.get_many::<String>("tables") {
        Some(values) => Some(parse_table_list(values)?),
        None => None,
    };

    validate_db_exists(&config.database_path)?;
    let pool = SqlitePool::open(&config.database_path, config.pool.clone()).map_err(CliError::from)?;
    let tuner = SchemaTuner::new(Arc::new(pool), Arc::new(FillerPhraseReducer::new()), config);

    let report = match tuner.fine_tune_tables(tables.as_deref()) {
        Ok(report) => report,
        Err(Error::BatchNotRecorded { report, source }) => {
            // The passes ran; show them before reporting the lost history.
            if !global.is_json() && !global.quiet {
                print_report(&report);
            }
            return Err(CliError::from(*source).into());
        }
        Err(e) => return Err(CliError::from(e).into()),
    };

    if global.is_json() {
        let mut output = JsonOutput::new();
        output.status(true);
        output.add_str("operation", "tune");
        output.add_uint("attempted", report.attempted as u64);
        output.add_uint("completed", report.completed() as u64);
        output.add_uint("improvements", report.total_improvements() as u64);
        output.add_float("elapsed_seconds", report.elapsed.as_secs_f64());
        output.add_value("results", &report.results);
        output.add_value("failures", &failure_pairs(&report));
        output.print();
    } else if !global.quiet {
        print_report(&report);
    }

    if matches.get_flag("show-stats") {
        render_history(&global, tuner.ledger())?;
    }

    Ok(())
}

fn failure_pairs(report: &BatchReport) -> Vec<serde_json::Value> {
    report
        .failures
        .iter()
        .map(|f| serde_json::json!({ "table": f.table, "error": f.message }))
        .collect()
}

fn print_report(report: &BatchReport) {
    print_header("Fine-Tuning Results");
    for result in &report.results {
        println!(
            "{} ({} columns, {} rows): {} improvements in {}",
            result.table_name,
            result.column_count,
            result.row_count,
            result.improvements.len(),
            format_seconds(result.execution_time)
        );
        for improvement in &result.improvements {
            println!("  • {}", improvement);
        }
    }
    for failure in &report.failures {
        print_warning(&format!("{}: {}", failure.table, failure.message));
    }

    println!();
    print_success(&format!(
        "Fine-tuned {}/{} tables with {} improvements in {}",
        report.completed(),
        report.attempted,
        report.total_improvements(),
        format_duration(report.elapsed)
    ));
}
