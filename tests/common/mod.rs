#![allow(dead_code)]

use rusqlite::Connection;
use schema_tuner::{
    FillerPhraseReducer, SchemaTuner, SqlitePool, TextReducer, TunerConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

/// A database file plus history location inside one temp directory
pub struct TestDatabase {
    pub dir: TempDir,
    pub db_path: PathBuf,
    pub history_path: PathBuf,
}

impl TestDatabase {
    pub fn new(schema: &str) -> Self {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("database.sqlite");
        let history_path = dir.path().join("logs").join("fine_tuning_history.json");

        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch(schema).unwrap();

        Self {
            dir,
            db_path,
            history_path,
        }
    }

    pub fn connection(&self) -> Connection {
        Connection::open(&self.db_path).unwrap()
    }

    pub fn config(&self) -> TunerConfig {
        TunerConfig {
            database_path: self.db_path.clone(),
            history_path: self.history_path.clone(),
            ..TunerConfig::default()
        }
    }

    pub fn tuner(&self) -> SchemaTuner {
        self.tuner_with(self.config(), Arc::new(FillerPhraseReducer::new()))
    }

    pub fn tuner_with(&self, config: TunerConfig, reducer: Arc<dyn TextReducer>) -> SchemaTuner {
        let pool = SqlitePool::open(&self.db_path, config.pool.clone()).unwrap();
        SchemaTuner::new(Arc::new(pool), reducer, config)
    }

    pub fn index_names(&self, table: &str) -> Vec<String> {
        let conn = self.connection();
        schema_tuner::catalog::list_indexes(&conn, table)
            .unwrap()
            .names()
            .to_vec()
    }
}

pub const ORDERS_SCHEMA: &str = "
    CREATE TABLE customers (
        id INTEGER PRIMARY KEY,
        email TEXT NOT NULL,
        tier INTEGER
    );
    CREATE TABLE orders (
        id INTEGER PRIMARY KEY,
        customer_id INTEGER NOT NULL REFERENCES customers(id),
        quantity INTEGER,
        note TEXT
    );
";

/// Insert `count` customers with unique emails and orders spread over them
pub fn seed_orders(conn: &Connection, count: usize) {
    let tx = conn.unchecked_transaction().unwrap();
    for i in 0..count {
        tx.execute(
            "INSERT INTO customers (email, tier) VALUES (?1, ?2)",
            rusqlite::params![format!("user{}@example.com", i), (i % 3) as i64],
        )
        .unwrap();
    }
    for i in 0..count {
        tx.execute(
            "INSERT INTO orders (customer_id, quantity, note) VALUES (?1, ?2, ?3)",
            rusqlite::params![(i % count.max(1)) as i64 + 1, (i % 10) as i64, "ok"],
        )
        .unwrap();
    }
    tx.commit().unwrap();
}
