//! Index materialization
//!
//! Issues `CREATE INDEX IF NOT EXISTS` with a deterministic name. The caller
//! checks existing index names first, so a rerun over an indexed column
//! yields neither a second index nor a second improvement.

use crate::catalog::{index_name, quote_ident};
use crate::recommend::{Improvement, IndexReason};
use crate::{Error, Result};
use rusqlite::Connection;
use tracing::info;

pub fn ensure_index(
    conn: &Connection,
    table: &str,
    column: &str,
    reason: IndexReason,
) -> Result<Improvement> {
    let name = index_name(table, column);
    let sql = format!(
        "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
        quote_ident(&name),
        quote_ident(table),
        quote_ident(column)
    );

    conn.execute_batch(&sql).map_err(|e| Error::IndexCreation {
        index: name.clone(),
        message: e.to_string(),
    })?;

    info!("Created index {} on {}({})", name, table, column);

    let text = match reason {
        IndexReason::ForeignKey => {
            format!("Added index {} on foreign key column '{}'", name, column)
        }
        IndexReason::HighCardinality(ratio) => format!(
            "Added index {} on high-cardinality column '{}' (cardinality {:.2})",
            name, column, ratio
        ),
    };
    Ok(Improvement::new(text))
}
