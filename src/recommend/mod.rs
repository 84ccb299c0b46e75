//! Recommendation engine
//!
//! Maps profiled statistics to improvements. Each step returns its
//! improvements in column order; the orchestrator concatenates them in the
//! fixed pipeline order: type, index, text, denormalization, storage.
//!
//! Indexing is the only step with a side effect: a candidate is materialized
//! immediately through [`crate::materializer::ensure_index`], so callers see
//! the same "improvement or nothing" contract as the pure steps.

pub mod denormalize;
pub mod indexing;
pub mod narrowing;
pub mod text;

use crate::catalog::{IndexSet, TableSchema};
use crate::config::TunerConfig;
use crate::profiler::ColumnProfile;
use crate::reducer::TextReducer;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub use indexing::{cardinality, IndexReason};
pub use text::percent_saved;

/// One human-readable suggested or applied change
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Improvement(String);

impl Improvement {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Improvement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Improvement> for String {
    fn from(improvement: Improvement) -> Self {
        improvement.0
    }
}

/// Column profiles of one table, keyed by column name
pub type ProfileMap = HashMap<String, ColumnProfile>;

pub struct RecommendationEngine<'a> {
    config: &'a TunerConfig,
    reducer: &'a dyn TextReducer,
}

impl<'a> RecommendationEngine<'a> {
    pub fn new(config: &'a TunerConfig, reducer: &'a dyn TextReducer) -> Self {
        Self { config, reducer }
    }

    /// Integer and text narrowing suggestions
    pub fn type_narrowing(&self, schema: &TableSchema, profiles: &ProfileMap) -> Vec<Improvement> {
        schema
            .columns
            .iter()
            .filter(|col| !col.is_key())
            .filter_map(|col| {
                let profile = profiles.get(&col.name)?;
                narrowing::narrow_integer(col, profile).or_else(|| {
                    narrowing::narrow_text(col, profile, self.config.text_narrowing_ceiling)
                })
            })
            .collect()
    }

    /// Create indexes for foreign keys and high-cardinality columns
    pub fn indexing(
        &self,
        conn: &Connection,
        schema: &TableSchema,
        profiles: &ProfileMap,
        row_count: u64,
        existing: &IndexSet,
    ) -> Vec<Improvement> {
        indexing::apply_index_candidates(
            conn,
            schema,
            profiles,
            row_count,
            existing,
            self.config.cardinality_threshold,
        )
    }

    /// Advisory token-reduction estimates for long text columns
    pub fn text_reduction(&self, schema: &TableSchema, profiles: &ProfileMap) -> Vec<Improvement> {
        schema
            .columns
            .iter()
            .filter(|col| !col.is_key())
            .filter_map(|col| {
                let profile = profiles.get(&col.name)?;
                text::token_reduction(&schema.table_name, col, profile, self.reducer, self.config)
            })
            .collect()
    }

    pub fn denormalization(&self, schema: &TableSchema) -> Vec<Improvement> {
        denormalize::recommend(schema)
    }
}
