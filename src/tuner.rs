//! Fine-tuning orchestration
//!
//! A table pass walks `Discovered -> SchemaRead -> Profiled -> Recommended
//! -> Indexed -> Reclaimed -> Completed`. Only a missing table ends in
//! `Failed`; every other step failure is logged and the pass moves on.

use crate::catalog::{self, IndexSet};
use crate::config::TunerConfig;
use crate::history::{FineTuningResult, HistoryLedger};
use crate::log_table_phase;
use crate::pool::ConnectionSource;
use crate::profiler;
use crate::reclaimer;
use crate::recommend::{ProfileMap, RecommendationEngine};
use crate::reducer::TextReducer;
use crate::{Error, Result};
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TablePhase {
    Discovered,
    SchemaRead,
    Profiled,
    Recommended,
    Indexed,
    Reclaimed,
    Completed,
    Failed,
}

/// A table whose pass ended in [`TablePhase::Failed`]
#[derive(Debug, Clone, PartialEq)]
pub struct TableFailure {
    pub table: String,
    pub message: String,
}

/// Outcome of one batch
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Completed passes, in input order
    pub results: Vec<FineTuningResult>,
    pub attempted: usize,
    pub failures: Vec<TableFailure>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn completed(&self) -> usize {
        self.results.len()
    }

    pub fn total_improvements(&self) -> usize {
        self.results.iter().map(|r| r.improvements.len()).sum()
    }
}

/// Schema fine-tuning advisor
///
/// Holds every collaborator explicitly: the connection source, the text
/// reducer used for token estimates, thresholds, and the history ledger.
pub struct SchemaTuner {
    source: Arc<dyn ConnectionSource>,
    reducer: Arc<dyn TextReducer>,
    config: TunerConfig,
    ledger: HistoryLedger,
}

impl SchemaTuner {
    pub fn new(
        source: Arc<dyn ConnectionSource>,
        reducer: Arc<dyn TextReducer>,
        config: TunerConfig,
    ) -> Self {
        let ledger = HistoryLedger::new(config.history_path.clone());
        Self {
            source,
            reducer,
            config,
            ledger,
        }
    }

    pub fn config(&self) -> &TunerConfig {
        &self.config
    }

    pub fn ledger(&self) -> &HistoryLedger {
        &self.ledger
    }

    /// Run one table pass
    ///
    /// Fails only with [`crate::Error::TableNotFound`] or when no connection can be
    /// obtained; every later step degrades to a shorter improvement list.
    /// The result carries the catalog's spelling of the table name.
    pub fn fine_tune_table(&self, table: &str) -> Result<FineTuningResult> {
        let start = Instant::now();
        log_table_phase!(table, TablePhase::Discovered);

        let conn = self.source.acquire()?;

        let resolved = catalog::resolve_table(&conn, table)?;
        let table = match resolved.as_deref() {
            Some(name) => name,
            None => {
                log_table_phase!(table, TablePhase::Failed);
                return Err(Error::TableNotFound {
                    table: table.to_string(),
                });
            }
        };

        let schema = match catalog::get_schema(&conn, table) {
            Ok(schema) => schema,
            Err(e) => {
                log_table_phase!(table, TablePhase::Failed);
                return Err(e);
            }
        };
        log_table_phase!(table, TablePhase::SchemaRead);

        let existing = catalog::list_indexes(&conn, table).unwrap_or_else(|e| {
            warn!("Could not list indexes of {}: {}", table, e);
            IndexSet::default()
        });
        let rows = profiler::row_count(&conn, table).unwrap_or_else(|e| {
            warn!("Could not count rows of {}: {}", table, e);
            0
        });

        let mut profiles = ProfileMap::new();
        for column in schema.columns.iter().filter(|c| !c.is_key()) {
            match profiler::profile_column(&conn, table, column, self.config.sample_size) {
                Ok(profile) => {
                    profiles.insert(column.name.clone(), profile);
                }
                Err(e) => warn!("Skipping column {}.{}: {}", table, column.name, e),
            }
        }
        log_table_phase!(table, TablePhase::Profiled);

        let engine = RecommendationEngine::new(&self.config, self.reducer.as_ref());
        let mut improvements = engine.type_narrowing(&schema, &profiles);
        log_table_phase!(table, TablePhase::Recommended);

        improvements.extend(engine.indexing(&conn, &schema, &profiles, rows, &existing));
        log_table_phase!(table, TablePhase::Indexed);

        improvements.extend(engine.text_reduction(&schema, &profiles));
        improvements.extend(engine.denormalization(&schema));
        improvements.extend(reclaimer::reclaim(&conn, table));
        log_table_phase!(table, TablePhase::Reclaimed);

        drop(conn);

        let result = FineTuningResult::new(
            table,
            schema.column_count(),
            rows,
            improvements,
            start.elapsed(),
        );
        log_table_phase!(table, TablePhase::Completed);
        Ok(result)
    }

    /// Tune every user table
    pub fn fine_tune_all_tables(&self) -> Result<BatchReport> {
        self.fine_tune_tables(None)
    }

    /// Tune `tables`, or every user table when `None`, then record the
    /// completed passes in the history ledger.
    ///
    /// Names that resolve to the same table are tuned once. When the ledger
    /// cannot be written the finished report comes back inside
    /// [`Error::BatchNotRecorded`].
    pub fn fine_tune_tables(&self, tables: Option<&[String]>) -> Result<BatchReport> {
        let start = Instant::now();

        let tables = match tables {
            Some(names) => self.resolve_names(names)?,
            None => {
                let conn = self.source.acquire()?;
                catalog::list_user_tables(&conn)?
            }
        };
        info!("Fine-tuning {} tables", tables.len());

        let outcomes = self.run_passes(&tables);

        let mut results = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for (table, outcome) in tables.iter().zip(outcomes) {
            match outcome {
                Ok(result) => {
                    info!(
                        "Fine-tuned {}: {} improvements in {:.2}s",
                        table,
                        result.improvements.len(),
                        result.execution_time
                    );
                    results.push(result);
                }
                Err(e) => {
                    error!("Error fine-tuning table {}: {}", table, e);
                    failures.push(TableFailure {
                        table: table.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        let recorded = self.ledger.append(&results);

        let report = BatchReport {
            attempted: tables.len(),
            results,
            failures,
            elapsed: start.elapsed(),
        };
        info!(
            "Fine-tuning complete: {}/{} tables, {} improvements in {:.2}s",
            report.completed(),
            report.attempted,
            report.total_improvements(),
            report.elapsed.as_secs_f64()
        );

        match recorded {
            Ok(()) => Ok(report),
            Err(e) => {
                error!("Fine-tuning history not saved: {}", e);
                Err(Error::BatchNotRecorded {
                    report: Box::new(report),
                    source: Box::new(e),
                })
            }
        }
    }

    /// Catalog names for `names`, first occurrence wins. Unknown names are
    /// kept as given so their passes report the missing table.
    fn resolve_names(&self, names: &[String]) -> Result<Vec<String>> {
        let conn = self.source.acquire()?;
        let mut seen = HashSet::new();
        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            let table = catalog::resolve_table(&conn, name)?.unwrap_or_else(|| name.clone());
            if seen.insert(table.to_ascii_lowercase()) {
                tables.push(table);
            }
        }
        Ok(tables)
    }

    fn run_passes(&self, tables: &[String]) -> Vec<Result<FineTuningResult>> {
        // Each pass holds one connection, so more workers than the source
        // can lend would only wait and time out.
        let workers = self
            .config
            .workers
            .min(tables.len())
            .min(self.source.max_concurrency())
            .max(1);
        if workers == 1 {
            return tables.iter().map(|t| self.fine_tune_table(t)).collect();
        }

        match rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("schema-tuner-{}", i))
            .build()
        {
            Ok(pool) => pool.install(|| {
                tables
                    .par_iter()
                    .map(|t| self.fine_tune_table(t))
                    .collect()
            }),
            Err(e) => {
                warn!("Falling back to sequential tuning: {}", e);
                tables.iter().map(|t| self.fine_tune_table(t)).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::SqlitePool;
    use crate::reducer::FillerPhraseReducer;
    use tempfile::tempdir;

    fn tuner(dir: &std::path::Path, workers: usize) -> (Arc<SqlitePool>, SchemaTuner) {
        let pool = Arc::new(SqlitePool::open_in_memory().unwrap());
        {
            let conn = pool.acquire().unwrap();
            conn.execute_batch(
                "CREATE TABLE customers (id INTEGER PRIMARY KEY, name TEXT);
                 CREATE TABLE orders (
                     id INTEGER PRIMARY KEY,
                     customer_id INTEGER REFERENCES customers(id),
                     qty INTEGER
                 );
                 INSERT INTO customers (name) VALUES ('ada'), ('grace');
                 INSERT INTO orders (customer_id, qty) VALUES (1, 3), (2, 5), (1, 3);",
            )
            .unwrap();
        }
        let config = TunerConfig {
            history_path: dir.join("history.json"),
            workers,
            ..TunerConfig::default()
        };
        let tuner = SchemaTuner::new(pool.clone(), Arc::new(FillerPhraseReducer::new()), config);
        (pool, tuner)
    }

    #[test]
    fn test_single_table_pipeline_order() {
        let dir = tempdir().unwrap();
        let (_pool, tuner) = tuner(dir.path(), 1);
        let result = tuner.fine_tune_table("orders").unwrap();

        assert_eq!(result.table_name, "orders");
        assert_eq!(result.column_count, 3);
        assert_eq!(result.row_count, 3);

        let texts: Vec<&str> = result.improvements.iter().map(|i| i.as_str()).collect();
        let narrowing = texts.iter().position(|t| t.contains("'qty' could use")).unwrap();
        let index = texts.iter().position(|t| t.contains("idx_orders_customer_id")).unwrap();
        assert!(narrowing < index);
        assert_eq!(*texts.last().unwrap(), reclaimer::ANALYZED);
    }

    #[test]
    fn test_missing_table_fails() {
        let dir = tempdir().unwrap();
        let (_pool, tuner) = tuner(dir.path(), 1);
        let err = tuner.fine_tune_table("archived_2019").unwrap_err();
        assert!(err.is_table_not_found());
    }

    #[test]
    fn test_discovery_and_ledger_write() {
        let dir = tempdir().unwrap();
        let (_pool, tuner) = tuner(dir.path(), 1);
        let report = tuner.fine_tune_all_tables().unwrap();

        assert_eq!(report.attempted, 2);
        assert_eq!(report.completed(), 2);
        assert!(report.failures.is_empty());
        assert_eq!(tuner.ledger().load().len(), 2);
    }

    #[test]
    fn test_duplicate_names_processed_once() {
        let dir = tempdir().unwrap();
        let (_pool, tuner) = tuner(dir.path(), 1);
        let names = vec!["orders".to_string(), "orders".to_string()];
        let report = tuner.fine_tune_tables(Some(&names)).unwrap();
        assert_eq!(report.attempted, 1);
    }

    #[test]
    fn test_case_variants_resolve_to_catalog_name() {
        let dir = tempdir().unwrap();
        let (_pool, tuner) = tuner(dir.path(), 2);
        assert_eq!(tuner.fine_tune_table("ORDERS").unwrap().table_name, "orders");

        let names = vec!["Orders".to_string(), "orders".to_string(), "ghost".to_string()];
        let report = tuner.fine_tune_tables(Some(&names)).unwrap();
        assert_eq!(report.attempted, 2);
        assert_eq!(report.results[0].table_name, "orders");
        assert_eq!(report.failures[0].table, "ghost");
    }

    #[test]
    fn test_unwritable_history_keeps_report() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, "").unwrap();
        let (_pool, tuner) = tuner(&blocker, 1);

        match tuner.fine_tune_all_tables() {
            Err(Error::BatchNotRecorded { report, source }) => {
                assert_eq!(report.completed(), 2);
                assert!(matches!(*source, Error::HistoryPersistence { .. }));
            }
            other => panic!("expected BatchNotRecorded, got {:?}", other.map(|r| r.attempted)),
        }
    }

    #[test]
    fn test_connection_returned_after_failure() {
        let dir = tempdir().unwrap();
        let (pool, tuner) = tuner(dir.path(), 1);
        let _ = tuner.fine_tune_table("missing");
        assert_eq!(pool.idle_connections(), 1);
    }
}
