//! Schema fine-tuning advisor for SQLite databases
//!
//! Inspects each user table, profiles its columns, and applies or suggests
//! improvements: narrower column types, indexes on foreign keys and
//! high-cardinality columns, token-reduction estimates for long text, and
//! storage reclamation. Every run is appended to a JSON history file.
//!
//! ```no_run
//! use schema_tuner::{FillerPhraseReducer, SchemaTuner, SqlitePool, TunerConfig};
//! use std::sync::Arc;
//!
//! let config = TunerConfig::default();
//! let pool = SqlitePool::open(&config.database_path, config.pool.clone())?;
//! let tuner = SchemaTuner::new(Arc::new(pool), Arc::new(FillerPhraseReducer::new()), config);
//! let report = tuner.fine_tune_all_tables()?;
//! println!("{}/{} tables tuned", report.completed(), report.attempted);
//! # Ok::<(), schema_tuner::Error>(())
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod materializer;
pub mod pool;
pub mod profiler;
pub mod reclaimer;
pub mod recommend;
pub mod reducer;
pub mod tuner;

pub use catalog::{ColumnInfo, ColumnKind, IndexSet, TableSchema};
pub use config::{ConfigSource, PoolConfig, TunerConfig};
pub use error::{Error, Result};
pub use history::{FineTuningResult, HistoryLedger, HistorySummary, ImprovementCategory};
pub use pool::{ConnectionSource, ScopedConnection, SqlitePool};
pub use profiler::ColumnProfile;
pub use recommend::{Improvement, IndexReason, RecommendationEngine};
pub use reducer::{word_count, FillerPhraseReducer, TextReducer};
pub use tuner::{BatchReport, SchemaTuner, TableFailure, TablePhase};
