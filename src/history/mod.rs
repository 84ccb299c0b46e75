//! Fine-tuning history
//!
//! Results of every run are appended to a single JSON file. The file is
//! rewritten in full on each batch: prior entries first, then the new ones.

mod ledger;
mod record;
mod summary;

pub use ledger::HistoryLedger;
pub use record::FineTuningResult;
pub use summary::{HistorySummary, ImprovementCategory};
