//! CLI error handling utilities
//!
//! Maps advisor errors onto user-facing messages and process exit codes.

use std::fmt;

/// CLI exit codes for different error categories
pub mod exit_codes {
    /// General error
    pub const GENERAL_ERROR: i32 = 1;
    /// Database file not found
    pub const NOT_FOUND: i32 = 3;
    /// Validation error
    pub const VALIDATION_ERROR: i32 = 5;
    /// Permission denied
    pub const PERMISSION_DENIED: i32 = 6;
    /// IO error
    pub const IO_ERROR: i32 = 7;
    /// Database operation error
    pub const DATABASE_ERROR: i32 = 8;
    /// Configuration error
    pub const CONFIG_ERROR: i32 = 9;
    /// History file could not be written
    pub const HISTORY_ERROR: i32 = 10;
}

/// CLI-specific error type with user-friendly messages
#[derive(Debug)]
pub enum CliError {
    /// Database file not found
    DatabaseNotFound(String),
    /// Invalid arguments
    Validation(String),
    /// Invalid configuration
    Config(String),
    /// IO error
    Io(String),
    /// Permission denied
    PermissionDenied(String),
    /// SQLite or analysis failure
    Database(String),
    /// History ledger write failure
    History(String),
}

impl CliError {
    /// Get the appropriate exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::DatabaseNotFound(_) => exit_codes::NOT_FOUND,
            CliError::Validation(_) => exit_codes::VALIDATION_ERROR,
            CliError::Config(_) => exit_codes::CONFIG_ERROR,
            CliError::Io(_) => exit_codes::IO_ERROR,
            CliError::PermissionDenied(_) => exit_codes::PERMISSION_DENIED,
            CliError::Database(_) => exit_codes::DATABASE_ERROR,
            CliError::History(_) => exit_codes::HISTORY_ERROR,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::DatabaseNotFound(path) => write!(
                f,
                "Database not found: {}. Pass --database or set SCHEMA_TUNER_DATABASE.",
                path
            ),
            CliError::Validation(msg) => write!(f, "Validation error: {}", msg),
            CliError::Config(msg) => write!(f, "{}", msg),
            CliError::Io(msg) => write!(f, "IO error: {}", msg),
            CliError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            CliError::Database(msg) => write!(f, "Database error: {}", msg),
            CliError::History(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => CliError::DatabaseNotFound(err.to_string()),
            std::io::ErrorKind::PermissionDenied => CliError::PermissionDenied(err.to_string()),
            _ => CliError::Io(err.to_string()),
        }
    }
}

impl From<schema_tuner::Error> for CliError {
    fn from(err: schema_tuner::Error) -> Self {
        use schema_tuner::Error;
        match err {
            Error::Config(_) => CliError::Config(err.to_string()),
            Error::HistoryPersistence { .. } => CliError::History(err.to_string()),
            Error::BatchNotRecorded { source, .. } => CliError::from(*source),
            Error::Io(io) => CliError::from(io),
            other => CliError::Database(other.to_string()),
        }
    }
}

/// Exit code for an error returned from a command handler
pub fn exit_code_for(error: &(dyn std::error::Error + 'static)) -> i32 {
    error
        .downcast_ref::<CliError>()
        .map(CliError::exit_code)
        .unwrap_or(exit_codes::GENERAL_ERROR)
}
