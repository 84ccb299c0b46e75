//! Advisor configuration
//!
//! Thresholds, sampling sizes and file locations used by a tuning run.
//! Values come from defaults, then an optional JSON file, then environment
//! variables; the CLI applies its own flags last.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration source types
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// JSON configuration file
    File(PathBuf),
    /// `SCHEMA_TUNER_*` environment variables
    Environment,
    /// Inline JSON document
    Inline(String),
}

/// Connection pool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum number of open connections
    pub max_connections: usize,
    /// Maximum time to wait for a free connection
    pub connection_timeout_ms: u64,
    /// SQLite busy handler timeout per connection
    pub busy_timeout_ms: u64,
}

impl PoolConfig {
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            connection_timeout_ms: 30_000,
            busy_timeout_ms: 5_000,
        }
    }
}

/// Advisor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunerConfig {
    /// Distinct/row ratio above which a column gets an index
    pub cardinality_threshold: f64,
    /// Rows drawn per text column for length analysis
    pub sample_size: usize,
    /// Text columns whose sampled max length is below this get a bounded type
    pub text_narrowing_ceiling: usize,
    /// Average sampled length above which token reduction is evaluated
    pub long_text_threshold: usize,
    /// Minimum word-count reduction (percent) worth reporting
    pub token_reduction_min_percent: f64,
    /// Tables processed concurrently
    pub workers: usize,
    /// SQLite database file
    pub database_path: PathBuf,
    /// Fine-tuning history file
    pub history_path: PathBuf,
    pub pool: PoolConfig,
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            cardinality_threshold: 0.7,
            sample_size: 50,
            text_narrowing_ceiling: 50,
            long_text_threshold: 100,
            token_reduction_min_percent: 20.0,
            workers: 1,
            database_path: PathBuf::from("data/database.sqlite"),
            history_path: PathBuf::from("logs/fine_tuning_history.json"),
            pool: PoolConfig::default(),
        }
    }
}

impl TunerConfig {
    /// Load configuration from a single source on top of the defaults
    pub fn load(source: &ConfigSource) -> Result<Self> {
        Self::default().merge(source)
    }

    /// Apply a source on top of this configuration
    ///
    /// File and inline documents only replace the keys they contain; nested
    /// tables such as `pool` are overlaid key by key.
    pub fn merge(self, source: &ConfigSource) -> Result<Self> {
        let config = match source {
            ConfigSource::File(path) => self.overlay(&read_file(path)?)?,
            ConfigSource::Inline(content) => self.overlay(content)?,
            ConfigSource::Environment => self.apply_env(|key| std::env::var(key).ok())?,
        };
        config.validate()?;
        Ok(config)
    }

    fn overlay(self, content: &str) -> Result<Self> {
        let patch: Value = serde_json::from_str(content)
            .map_err(|e| Error::Config(format!("JSON parse error: {}", e)))?;
        if !patch.is_object() {
            return Err(Error::Config("configuration must be a JSON object".into()));
        }
        let mut base = serde_json::to_value(&self)?;
        overlay_value(&mut base, patch);
        serde_json::from_value(base).map_err(|e| Error::Config(format!("Invalid configuration: {}", e)))
    }

    /// Overlay `SCHEMA_TUNER_*` variables read through `lookup`
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("SCHEMA_TUNER_DATABASE") {
            self.database_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("SCHEMA_TUNER_HISTORY") {
            self.history_path = PathBuf::from(path);
        }
        if let Some(value) = lookup("SCHEMA_TUNER_CARDINALITY_THRESHOLD") {
            self.cardinality_threshold = value
                .parse()
                .map_err(|_| Error::Config(format!("Invalid cardinality threshold: {}", value)))?;
        }
        if let Some(value) = lookup("SCHEMA_TUNER_SAMPLE_SIZE") {
            self.sample_size = value
                .parse()
                .map_err(|_| Error::Config(format!("Invalid sample size: {}", value)))?;
        }
        if let Some(value) = lookup("SCHEMA_TUNER_WORKERS") {
            self.workers = value
                .parse()
                .map_err(|_| Error::Config(format!("Invalid worker count: {}", value)))?;
        }
        Ok(self)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.cardinality_threshold > 0.0 && self.cardinality_threshold <= 1.0) {
            return Err(Error::Config(format!(
                "cardinality_threshold must be in (0, 1], got {}",
                self.cardinality_threshold
            )));
        }
        if self.sample_size == 0 {
            return Err(Error::Config("sample_size must be at least 1".into()));
        }
        if self.workers == 0 {
            return Err(Error::Config("workers must be at least 1".into()));
        }
        if self.pool.max_connections == 0 {
            return Err(Error::Config("pool.max_connections must be at least 1".into()));
        }
        if !(0.0..100.0).contains(&self.token_reduction_min_percent) {
            return Err(Error::Config(format!(
                "token_reduction_min_percent must be in [0, 100), got {}",
                self.token_reduction_min_percent
            )));
        }
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))
}

fn overlay_value(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                overlay_value(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (base, patch) => *base = patch,
    }
}
