use crate::tuner::BatchReport;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Table not found: {table}")]
    TableNotFound { table: String },

    #[error("Column analysis failed for {table}.{column}: {message}")]
    ColumnAnalysis {
        table: String,
        column: String,
        message: String,
    },

    #[error("Index creation failed for {index}: {message}")]
    IndexCreation { index: String, message: String },

    #[error("Storage reclaim failed for {table}: {message}")]
    StorageReclaim { table: String, message: String },

    #[error("History ledger at {} could not be written: {message}", .path.display())]
    HistoryPersistence { path: PathBuf, message: String },

    /// The batch ran but its results could not be added to the history.
    #[error("Batch of {} tables not recorded: {source}", .report.attempted)]
    BatchNotRecorded {
        report: Box<BatchReport>,
        source: Box<Error>,
    },

    #[error("Text reduction error: {0}")]
    TextReduction(String),

    #[error("Timed out after {0:?} waiting for a database connection")]
    ConnectionTimeout(Duration),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn column_analysis(
        table: impl Into<String>,
        column: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::ColumnAnalysis {
            table: table.into(),
            column: column.into(),
            message: message.into(),
        }
    }

    /// True for the one error that aborts a single table's analysis.
    pub fn is_table_not_found(&self) -> bool {
        matches!(self, Error::TableNotFound { .. })
    }

    pub fn error_code(&self) -> i32 {
        match self {
            Error::TableNotFound { .. } => -1,
            Error::ColumnAnalysis { .. } => -2,
            Error::IndexCreation { .. } => -3,
            Error::StorageReclaim { .. } => -4,
            Error::HistoryPersistence { .. } => -5,
            Error::TextReduction(_) => -6,
            Error::ConnectionTimeout(_) => -7,
            Error::Config(_) => -8,
            Error::Sqlite(_) => -9,
            Error::Io(_) => -10,
            Error::Json(_) => -11,
            Error::BatchNotRecorded { .. } => -12,
        }
    }
}
