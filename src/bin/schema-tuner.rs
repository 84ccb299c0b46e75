mod cli;

use cli::utils::{exit_code_for, json_error, print_error};
use cli::GlobalOptions;
use schema_tuner::logging::init_logging;

fn main() {
    let matches = cli::build_cli().get_matches();

    let global = matches
        .subcommand()
        .map(|(_, sub)| GlobalOptions::from_matches(sub))
        .unwrap_or_else(|| GlobalOptions::from_matches(&matches));
    init_logging(global.log_level(), global.is_json());

    if let Err(e) = cli::run(matches) {
        if global.is_json() {
            json_error(&e.to_string()).print();
        } else {
            print_error(&e.to_string());
        }
        std::process::exit(exit_code_for(e.as_ref()));
    }
}
