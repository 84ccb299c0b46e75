//! Input validation utilities for CLI commands
//!
//! Provides consistent validation across all CLI commands with clear error messages.

#![allow(dead_code)]

use super::error::CliError;
use std::path::Path;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Validation limits for CLI operations
pub mod limits {
    /// Maximum concurrent table passes
    pub const MAX_WORKERS: usize = 64;
}

/// Validate the worker count for a tuning batch
pub fn validate_workers(workers: usize) -> CliResult<()> {
    if workers == 0 {
        return Err(CliError::Validation("workers must be at least 1".into()).into());
    }
    if workers > limits::MAX_WORKERS {
        return Err(CliError::Validation(format!(
            "workers cannot exceed {}",
            limits::MAX_WORKERS
        ))
        .into());
    }
    Ok(())
}

/// Validate that the database file exists
pub fn validate_db_exists(path: &Path) -> CliResult<()> {
    if !path.exists() {
        return Err(CliError::DatabaseNotFound(path.display().to_string()).into());
    }
    Ok(())
}

/// Flatten repeated and comma-separated `--tables` values
///
/// Blank entries are dropped; an argument that yields no names at all is
/// rejected.
pub fn parse_table_list<'a, I>(values: I) -> CliResult<Vec<String>>
where
    I: IntoIterator<Item = &'a String>,
{
    let tables: Vec<String> = values
        .into_iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    if tables.is_empty() {
        return Err(CliError::Validation("--tables requires at least one table name".into()).into());
    }
    Ok(tables)
}
