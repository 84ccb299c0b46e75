use super::FineTuningResult;
use crate::{Error, Result};
use parking_lot::Mutex;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// JSON-array history file, rewritten in full on every append
///
/// Prior records are carried over verbatim, so entries written by other
/// tools or older versions survive a merge.
pub struct HistoryLedger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for HistoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryLedger").field("path", &self.path).finish()
    }
}

impl HistoryLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read-merge-write: prior entries followed by `results`, in order
    pub fn append(&self, results: &[FineTuningResult]) -> Result<()> {
        let _guard = self.write_lock.lock();

        let mut entries = self.read_entries();
        let prior = entries.len();
        for result in results {
            entries.push(serde_json::to_value(result)?);
        }

        self.write_entries(&entries)?;
        info!(
            "Recorded {} fine-tuning results in {} ({} total)",
            results.len(),
            self.path.display(),
            prior + results.len()
        );
        Ok(())
    }

    /// All entries that parse as fine-tuning results, in file order
    pub fn load(&self) -> Vec<FineTuningResult> {
        self.read_entries()
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(result) => Some(result),
                Err(e) => {
                    debug!("Skipping unrecognized history entry: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Raw entries; a missing or corrupt file reads as empty
    fn read_entries(&self) -> Vec<Value> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("Cannot read history {}, starting empty: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Array(entries)) => entries,
            Ok(_) => {
                warn!("History {} is not a JSON array, starting empty", self.path.display());
                Vec::new()
            }
            Err(e) => {
                warn!("History {} is corrupt, starting empty: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    fn write_entries(&self, entries: &[Value]) -> Result<()> {
        let persist_error = |message: String| Error::HistoryPersistence {
            path: self.path.clone(),
            message,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| persist_error(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, json).map_err(|e| persist_error(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommend::Improvement;
    use std::time::Duration;
    use tempfile::tempdir;

    fn result(table: &str) -> FineTuningResult {
        FineTuningResult::new(
            table,
            2,
            10,
            vec![Improvement::new("Analyzed table for improved query planning")],
            Duration::from_millis(5),
        )
    }

    #[test]
    fn test_append_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let ledger = HistoryLedger::new(dir.path().join("logs").join("history.json"));
        ledger.append(&[result("orders")]).unwrap();
        assert_eq!(ledger.load().len(), 1);
    }

    #[test]
    fn test_corrupt_file_degrades_to_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{ definitely not json").unwrap();

        let ledger = HistoryLedger::new(&path);
        assert!(ledger.load().is_empty());
        ledger.append(&[result("orders")]).unwrap();
        assert_eq!(ledger.load()[0].table_name, "orders");
    }

    #[test]
    fn test_non_array_degrades_to_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, r#"{"table_name": "x"}"#).unwrap();
        let ledger = HistoryLedger::new(&path);
        ledger.append(&[result("a"), result("b")]).unwrap();
        assert_eq!(ledger.load().len(), 2);
    }

    #[test]
    fn test_foreign_entries_preserved_verbatim() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, r#"[{"note": "hand-written"}]"#).unwrap();

        let ledger = HistoryLedger::new(&path);
        ledger.append(&[result("orders")]).unwrap();

        let raw: Vec<Value> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[0]["note"], "hand-written");
        assert_eq!(ledger.load().len(), 1);
    }

    #[test]
    fn test_unwritable_path_surfaces_error() {
        let dir = tempdir().unwrap();
        // A directory where the file should be.
        let path = dir.path().join("history.json");
        fs::create_dir(&path).unwrap();

        let ledger = HistoryLedger::new(&path);
        let err = ledger.append(&[result("orders")]).unwrap_err();
        assert!(matches!(err, Error::HistoryPersistence { .. }));
    }
}
