//! Column statistics
//!
//! Exact aggregates (row count, min/max/average, distinct count) come from a
//! full pass; text lengths come from a bounded random sample.

use crate::catalog::{quote_ident, ColumnInfo, ColumnKind};
use crate::{Error, Result};
use rusqlite::types::Value;
use rusqlite::Connection;

/// Statistics for one column, discarded after the table's pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnProfile {
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    /// Numeric kinds only
    pub average_value: Option<f64>,
    pub distinct_count: u64,
    /// Non-null values not stored as integers (numeric kinds only)
    pub non_integer_count: u64,
    /// Sampled values (text kinds only)
    pub samples: Vec<String>,
}

impl ColumnProfile {
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Longest sampled value in characters, `None` without samples
    pub fn max_sample_length(&self) -> Option<usize> {
        self.samples.iter().map(|s| s.chars().count()).max()
    }

    pub fn average_sample_length(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let total: usize = self.samples.iter().map(|s| s.chars().count()).sum();
        Some(total as f64 / self.samples.len() as f64)
    }

    /// Every non-null value is an integer and at least one exists
    pub fn is_integral(&self) -> bool {
        self.min_value.is_some() && self.non_integer_count == 0
    }
}

pub fn row_count(conn: &Connection, table: &str) -> Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
    let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(count.max(0) as u64)
}

/// Profile one column according to its kind
pub fn profile_column(
    conn: &Connection,
    table: &str,
    column: &ColumnInfo,
    sample_size: usize,
) -> Result<ColumnProfile> {
    let kind = column.kind();
    let mut profile = if kind.is_numeric() {
        numeric_aggregates(conn, table, &column.name)?
    } else {
        ColumnProfile {
            distinct_count: distinct_count(conn, table, &column.name)?,
            ..ColumnProfile::default()
        }
    };

    if kind == ColumnKind::Text {
        profile.samples = sample_values(conn, table, &column.name, sample_size)?;
    }

    Ok(profile)
}

fn numeric_aggregates(conn: &Connection, table: &str, column: &str) -> Result<ColumnProfile> {
    let col = quote_ident(column);
    let sql = format!(
        "SELECT MIN({col}), MAX({col}), AVG({col}), COUNT(DISTINCT {col}), \
         COUNT(CASE WHEN typeof({col}) != 'integer' THEN 1 END) \
         FROM {table} WHERE {col} IS NOT NULL",
        col = col,
        table = quote_ident(table),
    );

    let (min, max, avg, distinct, non_integer) = conn.query_row(&sql, [], |row| {
        Ok((
            row.get::<_, Value>(0)?,
            row.get::<_, Value>(1)?,
            row.get::<_, Option<f64>>(2)?,
            row.get::<_, i64>(3)?,
            row.get::<_, i64>(4)?,
        ))
    })?;

    Ok(ColumnProfile {
        min_value: as_number(table, column, min)?,
        max_value: as_number(table, column, max)?,
        average_value: avg,
        distinct_count: distinct.max(0) as u64,
        non_integer_count: non_integer.max(0) as u64,
        samples: Vec::new(),
    })
}

fn as_number(table: &str, column: &str, value: Value) -> Result<Option<f64>> {
    match value {
        Value::Null => Ok(None),
        Value::Integer(i) => Ok(Some(i as f64)),
        Value::Real(r) => Ok(Some(r)),
        Value::Text(_) | Value::Blob(_) => Err(Error::column_analysis(
            table,
            column,
            "non-numeric value in numeric column",
        )),
    }
}

fn distinct_count(conn: &Connection, table: &str, column: &str) -> Result<u64> {
    let sql = format!(
        "SELECT COUNT(DISTINCT {col}) FROM {table} WHERE {col} IS NOT NULL",
        col = quote_ident(column),
        table = quote_ident(table),
    );
    let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(count.max(0) as u64)
}

/// Random sample of non-null values rendered as text
pub fn sample_values(
    conn: &Connection,
    table: &str,
    column: &str,
    sample_size: usize,
) -> Result<Vec<String>> {
    let sql = format!(
        "SELECT {col} FROM {table} WHERE {col} IS NOT NULL ORDER BY random() LIMIT ?1",
        col = quote_ident(column),
        table = quote_ident(table),
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([sample_size as i64], |row| row.get::<_, Value>(0))?;

    let mut samples = Vec::with_capacity(sample_size);
    for value in rows {
        match value? {
            Value::Text(s) => samples.push(s),
            Value::Integer(i) => samples.push(i.to_string()),
            Value::Real(r) => samples.push(r.to_string()),
            Value::Blob(_) | Value::Null => {}
        }
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, ty: &str) -> ColumnInfo {
        ColumnInfo {
            name: name.into(),
            declared_type: ty.into(),
            is_primary_key: false,
            is_foreign_key: false,
        }
    }

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE people (id INTEGER PRIMARY KEY, age INTEGER, score REAL, bio TEXT);
             INSERT INTO people (age, score, bio) VALUES (10, 1.5, 'short');
             INSERT INTO people (age, score, bio) VALUES (20, 2.5, 'a bit longer');
             INSERT INTO people (age, score, bio) VALUES (20, NULL, NULL);
             INSERT INTO people (age, score, bio) VALUES (NULL, 4.0, 'x');",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_row_count() {
        let conn = setup();
        assert_eq!(row_count(&conn, "people").unwrap(), 4);
    }

    #[test]
    fn test_integer_profile_ignores_nulls() {
        let conn = setup();
        let profile = profile_column(&conn, "people", &column("age", "INTEGER"), 50).unwrap();
        assert_eq!(profile.min_value, Some(10.0));
        assert_eq!(profile.max_value, Some(20.0));
        assert!((profile.average_value.unwrap() - 50.0 / 3.0).abs() < 1e-9);
        assert_eq!(profile.distinct_count, 2);
        assert!(profile.is_integral());
        assert!(profile.samples.is_empty());
    }

    #[test]
    fn test_real_values_are_not_integral() {
        let conn = setup();
        let profile = profile_column(&conn, "people", &column("score", "REAL"), 50).unwrap();
        assert_eq!(profile.non_integer_count, 3);
        assert!(!profile.is_integral());
    }

    #[test]
    fn test_text_profile_samples_non_null_values() {
        let conn = setup();
        let profile = profile_column(&conn, "people", &column("bio", "TEXT"), 50).unwrap();
        assert_eq!(profile.sample_count(), 3);
        assert_eq!(profile.distinct_count, 3);
        assert_eq!(profile.max_sample_length(), Some(12));
        assert_eq!(profile.min_value, None);
    }

    #[test]
    fn test_sample_is_bounded() {
        let conn = setup();
        let samples = sample_values(&conn, "people", "bio", 2).unwrap();
        assert_eq!(samples.len(), 2);
    }

    #[test]
    fn test_empty_table_profiles_to_nothing() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE empty (n INTEGER, t TEXT)").unwrap();
        assert_eq!(row_count(&conn, "empty").unwrap(), 0);

        let numeric = profile_column(&conn, "empty", &column("n", "INTEGER"), 50).unwrap();
        assert_eq!(numeric.min_value, None);
        assert_eq!(numeric.average_value, None);
        assert_eq!(numeric.distinct_count, 0);
        assert!(!numeric.is_integral());

        let text = profile_column(&conn, "empty", &column("t", "TEXT"), 50).unwrap();
        assert_eq!(text.max_sample_length(), None);
        assert_eq!(text.average_sample_length(), None);
    }

    #[test]
    fn test_text_in_integer_column_is_analysis_error() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (n INTEGER); INSERT INTO t VALUES ('abc');").unwrap();
        let err = profile_column(&conn, "t", &column("n", "INTEGER"), 50).unwrap_err();
        assert!(matches!(err, Error::ColumnAnalysis { .. }));
    }
}
