//! Catalog inspection
//!
//! Reads table structure from the SQLite catalog: column definitions with
//! primary-key markers, foreign-key columns, and existing index names.

use crate::{Error, Result};
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashSet;
use std::fmt;

/// Storage class of a column, derived from its declared type using SQLite's
/// affinity rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Integer,
    Text,
    Blob,
    Real,
    Numeric,
}

impl ColumnKind {
    pub fn from_declared_type(declared: &str) -> Self {
        let upper = declared.to_ascii_uppercase();
        if upper.contains("INT") {
            ColumnKind::Integer
        } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
            ColumnKind::Text
        } else if upper.is_empty() || upper.contains("BLOB") {
            ColumnKind::Blob
        } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
            ColumnKind::Real
        } else {
            ColumnKind::Numeric
        }
    }

    /// Kinds profiled with min/max/average aggregates
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Real | ColumnKind::Numeric)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub declared_type: String,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
}

impl ColumnInfo {
    pub fn kind(&self) -> ColumnKind {
        ColumnKind::from_declared_type(&self.declared_type)
    }

    /// Key columns are never narrowed or profiled
    pub fn is_key(&self) -> bool {
        self.is_primary_key || self.is_foreign_key
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<ColumnInfo>,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// Quote an identifier for interpolation into SQL
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Deterministic name of the index the advisor creates for a column
pub fn index_name(table: &str, column: &str) -> String {
    format!("idx_{}_{}", table, column)
}

/// Existing index names of a table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSet {
    names: Vec<String>,
}

impl IndexSet {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// True when some index name, with an optional `idx_` prefix removed,
    /// starts with `<table>_<column>` (case-insensitive)
    pub fn covers(&self, table: &str, column: &str) -> bool {
        let wanted = format!("{}_{}", table, column).to_lowercase();
        self.names.iter().any(|name| {
            let name = name.to_lowercase();
            let stem = name.strip_prefix("idx_").unwrap_or(&name);
            stem.starts_with(&wanted)
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl fmt::Display for TableSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (", self.table_name)?;
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", col.name, col.declared_type)?;
            if col.is_primary_key {
                write!(f, " PK")?;
            }
            if col.is_foreign_key {
                write!(f, " FK")?;
            }
        }
        write!(f, ")")
    }
}

/// Read a table's columns with key markers
///
/// Fails with [`Error::TableNotFound`] when the catalog has no columns for
/// `table`, which covers both missing and concurrently dropped tables.
pub fn get_schema(conn: &Connection, table: &str) -> Result<TableSchema> {
    let mut stmt = conn.prepare("SELECT name, type, pk FROM pragma_table_info(?1) ORDER BY cid")?;
    let rows = stmt.query_map([table], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            row.get::<_, i64>(2)?,
        ))
    })?;

    let mut columns = Vec::new();
    for row in rows {
        let (name, declared_type, pk) = row?;
        columns.push(ColumnInfo {
            name,
            declared_type,
            is_primary_key: pk > 0,
            is_foreign_key: false,
        });
    }

    if columns.is_empty() {
        return Err(Error::TableNotFound {
            table: table.to_string(),
        });
    }

    let foreign = foreign_key_columns(conn, table)?;
    for col in &mut columns {
        col.is_foreign_key = foreign.contains(&col.name);
    }

    Ok(TableSchema {
        table_name: table.to_string(),
        columns,
    })
}

fn foreign_key_columns(conn: &Connection, table: &str) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare("SELECT \"from\" FROM pragma_foreign_key_list(?1)")?;
    let rows = stmt.query_map([table], |row| row.get::<_, Option<String>>(0))?;
    let mut columns = HashSet::new();
    for row in rows {
        if let Some(name) = row? {
            columns.insert(name);
        }
    }
    Ok(columns)
}

pub fn list_indexes(conn: &Connection, table: &str) -> Result<IndexSet> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_index_list(?1)")?;
    let names = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(IndexSet::new(names))
}

/// All user tables in catalog order, excluding SQLite's internal tables
pub fn list_user_tables(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
    )?;
    let tables = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(tables)
}

/// The catalog's spelling of a user table name
///
/// SQLite matches identifiers case-insensitively, so `ORDERS` and `orders`
/// name the same table. Returns `None` when no such table exists.
pub fn resolve_table(conn: &Connection, name: &str) -> Result<Option<String>> {
    let name = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
            [name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(name)
}
