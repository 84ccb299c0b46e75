use super::{Improvement, ProfileMap};
use crate::catalog::{index_name, ColumnInfo, IndexSet, TableSchema};
use crate::materializer;
use crate::profiler::ColumnProfile;
use rusqlite::Connection;
use tracing::warn;

/// Why a column gets an index
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndexReason {
    ForeignKey,
    HighCardinality(f64),
}

/// `distinct / rows`, undefined for an empty table
pub fn cardinality(distinct_count: u64, row_count: u64) -> Option<f64> {
    if row_count == 0 {
        return None;
    }
    Some(distinct_count as f64 / row_count as f64)
}

/// Decide whether a column not yet indexed should be
pub fn index_reason(
    column: &ColumnInfo,
    profile: Option<&ColumnProfile>,
    row_count: u64,
    threshold: f64,
) -> Option<IndexReason> {
    if column.is_primary_key {
        return None;
    }
    if column.is_foreign_key {
        return Some(IndexReason::ForeignKey);
    }
    let ratio = cardinality(profile?.distinct_count, row_count)?;
    (ratio > threshold).then_some(IndexReason::HighCardinality(ratio))
}

pub(crate) fn apply_index_candidates(
    conn: &Connection,
    schema: &TableSchema,
    profiles: &ProfileMap,
    row_count: u64,
    existing: &IndexSet,
    threshold: f64,
) -> Vec<Improvement> {
    let table = &schema.table_name;
    let mut improvements = Vec::new();

    for column in &schema.columns {
        if existing.covers(table, &column.name) {
            continue;
        }
        let Some(reason) = index_reason(column, profiles.get(&column.name), row_count, threshold) else {
            continue;
        };

        match materializer::ensure_index(conn, table, &column.name, reason) {
            Ok(improvement) => improvements.push(improvement),
            Err(e) => warn!(
                "Could not create index {}: {}",
                index_name(table, &column.name),
                e
            ),
        }
    }

    improvements
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(pk: bool, fk: bool) -> ColumnInfo {
        ColumnInfo {
            name: "c".into(),
            declared_type: "INTEGER".into(),
            is_primary_key: pk,
            is_foreign_key: fk,
        }
    }

    fn distinct(n: u64) -> ColumnProfile {
        ColumnProfile {
            distinct_count: n,
            ..ColumnProfile::default()
        }
    }

    #[test]
    fn test_cardinality_ratio() {
        assert_eq!(cardinality(100, 100), Some(1.0));
        assert_eq!(cardinality(35, 50), Some(0.7));
        assert_eq!(cardinality(0, 0), None);
        assert_eq!(cardinality(5, 0), None);
    }

    #[test]
    fn test_unique_column_always_flagged() {
        let reason = index_reason(&column(false, false), Some(&distinct(100)), 100, 0.7);
        assert_eq!(reason, Some(IndexReason::HighCardinality(1.0)));
    }

    #[test]
    fn test_threshold_is_strict() {
        assert_eq!(index_reason(&column(false, false), Some(&distinct(70)), 100, 0.7), None);
        assert!(index_reason(&column(false, false), Some(&distinct(71)), 100, 0.7).is_some());
    }

    #[test]
    fn test_keys() {
        assert_eq!(index_reason(&column(true, false), Some(&distinct(100)), 100, 0.7), None);
        assert_eq!(index_reason(&column(false, true), None, 0, 0.7), Some(IndexReason::ForeignKey));
    }

    #[test]
    fn test_empty_table_never_cardinality_candidate() {
        assert_eq!(index_reason(&column(false, false), Some(&distinct(0)), 0, 0.7), None);
        assert_eq!(index_reason(&column(false, false), None, 10, 0.7), None);
    }
}
