//! CLI command modules
//!
//! - tune: Run the advisor over some or all tables
//! - stats: Summarize the fine-tuning history
//! - config: Print the effective configuration

pub mod config;
pub mod stats;
pub mod tune;

use crate::cli::utils::{CliError, CliResult};
use crate::cli::GlobalOptions;
use schema_tuner::{ConfigSource, TunerConfig};

/// Resolve configuration: defaults, config file, environment, global flags
pub fn effective_config(global: &GlobalOptions) -> CliResult<TunerConfig> {
    let mut config = TunerConfig::default();
    if let Some(path) = &global.config {
        config = config
            .merge(&ConfigSource::File(path.clone()))
            .map_err(CliError::from)?;
    }
    config = config
        .merge(&ConfigSource::Environment)
        .map_err(CliError::from)?;

    if let Some(database) = &global.database {
        config.database_path = database.clone();
    }
    if let Some(history) = &global.history {
        config.history_path = history.clone();
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("tuner.json");
        std::fs::write(
            &file,
            r#"{"database_path": "from_file.sqlite", "sample_size": 7}"#,
        )
        .unwrap();

        let global = GlobalOptions {
            config: Some(file),
            history: Some(PathBuf::from("flag_history.json")),
            ..GlobalOptions::default()
        };
        let config = effective_config(&global).unwrap();
        assert_eq!(config.sample_size, 7);
        assert_eq!(config.history_path, PathBuf::from("flag_history.json"));

        let global = GlobalOptions {
            database: Some(PathBuf::from("flag.sqlite")),
            ..global
        };
        let config = effective_config(&global).unwrap();
        assert_eq!(config.database_path, PathBuf::from("flag.sqlite"));
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let global = GlobalOptions {
            config: Some(PathBuf::from("/nonexistent/tuner.json")),
            ..GlobalOptions::default()
        };
        assert!(effective_config(&global).is_err());
    }
}
