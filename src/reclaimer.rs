//! Storage reclamation
//!
//! Per-table compaction is best effort: SQLite only vacuums whole databases,
//! so `VACUUM "<table>"` normally fails and is skipped quietly. A table named
//! like a schema (`main`, `temp`, an attached alias) is never vacuumed, since
//! that would compact the whole database. The planner statistics refresh is
//! expected to succeed and is always reported.

use crate::catalog::quote_ident;
use crate::recommend::Improvement;
use crate::{Error, Result};
use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, warn};

pub const ANALYZED: &str = "Analyzed table for improved query planning";

pub fn reclaim(conn: &Connection, table: &str) -> Vec<Improvement> {
    let mut improvements = Vec::new();

    match compact(conn, table) {
        Ok(()) => improvements.push(Improvement::new(format!(
            "Reclaimed unused storage for table '{}'",
            table
        ))),
        Err(e) => debug!("Skipping storage compaction for {}: {}", table, e),
    }

    match refresh_statistics(conn, table) {
        Ok(()) => improvements.push(Improvement::new(ANALYZED)),
        Err(e) => warn!("Planner statistics refresh failed for {}: {}", table, e),
    }

    improvements
}

fn compact(conn: &Connection, table: &str) -> Result<()> {
    if names_schema(conn, table)? {
        return Err(Error::StorageReclaim {
            table: table.to_string(),
            message: "name refers to a schema".into(),
        });
    }
    conn.execute_batch(&format!("VACUUM {}", quote_ident(table)))
        .map_err(|e| Error::StorageReclaim {
            table: table.to_string(),
            message: e.to_string(),
        })
}

fn names_schema(conn: &Connection, name: &str) -> Result<bool> {
    if name.eq_ignore_ascii_case("temp") {
        return Ok(true);
    }
    let found = conn
        .query_row(
            "SELECT 1 FROM pragma_database_list WHERE name = ?1 COLLATE NOCASE",
            [name],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn refresh_statistics(conn: &Connection, table: &str) -> Result<()> {
    // Schema-qualified so a table called `main` is not read as a schema.
    conn.execute_batch(&format!("ANALYZE main.{}", quote_ident(table)))
        .map_err(|e| Error::StorageReclaim {
            table: table.to_string(),
            message: e.to_string(),
        })
}
