use super::FineTuningResult;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Coarse grouping of improvement texts for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImprovementCategory {
    Index,
    Type,
    Text,
    Storage,
    Other,
}

impl ImprovementCategory {
    pub fn classify(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower.contains("index") {
            Self::Index
        } else if lower.contains("token") || lower.contains("text column") {
            Self::Text
        } else if lower.contains("column") && lower.contains("could") {
            Self::Type
        } else if lower.contains("storage") || lower.contains("vacuum") || lower.contains("analyz") {
            Self::Storage
        } else {
            Self::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Type => "type",
            Self::Text => "text",
            Self::Storage => "storage",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ImprovementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate view over the history ledger
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistorySummary {
    pub records: usize,
    pub total_tables: usize,
    pub total_improvements: usize,
    /// Seconds, averaged over records
    pub average_execution_time: f64,
    /// Improvement texts per category, most recent record first
    pub categories: BTreeMap<ImprovementCategory, Vec<String>>,
}

impl HistorySummary {
    pub fn from_records(records: &[FineTuningResult]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let mut ordered: Vec<&FineTuningResult> = records.iter().collect();
        ordered.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let total_tables = ordered
            .iter()
            .map(|r| r.table_name.as_str())
            .collect::<HashSet<_>>()
            .len();
        let total_improvements = ordered.iter().map(|r| r.improvements.len()).sum();
        let average_execution_time =
            ordered.iter().map(|r| r.execution_time).sum::<f64>() / ordered.len() as f64;

        let mut categories: BTreeMap<ImprovementCategory, Vec<String>> = BTreeMap::new();
        for improvement in ordered.iter().flat_map(|r| r.improvements.iter()) {
            categories
                .entry(ImprovementCategory::classify(improvement.as_str()))
                .or_default()
                .push(improvement.to_string());
        }

        Self {
            records: ordered.len(),
            total_tables,
            total_improvements,
            average_execution_time,
            categories,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommend::Improvement;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    fn record(table: &str, hour: u32, secs: f64, improvements: &[&str]) -> FineTuningResult {
        let mut r = FineTuningResult::new(
            table,
            3,
            10,
            improvements.iter().map(|s| Improvement::new(*s)).collect(),
            Duration::from_secs_f64(secs),
        );
        r.timestamp = Utc.with_ymd_and_hms(2026, 1, 1, hour, 0, 0).unwrap();
        r
    }

    #[test]
    fn test_classification_of_generated_texts() {
        use ImprovementCategory::*;
        let cases = [
            ("Added index idx_orders_customer_id on foreign key column 'customer_id'", Index),
            ("Column 'age' could use TINYINT UNSIGNED instead of INTEGER (values 0..127)", Type),
            ("Column 'code' could use VARCHAR(10) instead of TEXT (longest sampled value: 5 chars)", Type),
            (
                "Text column 'body' could save 25% of tokens with text reduction (280 -> 210 words over 10 samples)",
                Text,
            ),
            ("Reclaimed unused storage for table 'orders'", Storage),
            ("Analyzed table for improved query planning", Storage),
            ("Something else entirely", Other),
        ];
        for (text, expected) in cases {
            assert_eq!(ImprovementCategory::classify(text), expected, "{text}");
        }
    }

    #[test]
    fn test_summary_counts_and_ordering() {
        let records = vec![
            record("orders", 1, 1.0, &["Added index idx_orders_a on foreign key column 'a'"]),
            record("orders", 3, 2.0, &["Added index idx_orders_b on foreign key column 'b'"]),
            record("customers", 2, 3.0, &["Analyzed table for improved query planning"]),
        ];
        let summary = HistorySummary::from_records(&records);

        assert_eq!(summary.records, 3);
        assert_eq!(summary.total_tables, 2);
        assert_eq!(summary.total_improvements, 3);
        assert!((summary.average_execution_time - 2.0).abs() < 1e-9);

        let index = &summary.categories[&ImprovementCategory::Index];
        assert!(index[0].contains("idx_orders_b"));
        assert!(index[1].contains("idx_orders_a"));
        assert_eq!(summary.categories[&ImprovementCategory::Storage].len(), 1);
    }

    #[test]
    fn test_empty_history() {
        let summary = HistorySummary::from_records(&[]);
        assert!(summary.is_empty());
        assert!(summary.categories.is_empty());
    }
}
