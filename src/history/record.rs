use crate::recommend::Improvement;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of one table's fine-tuning pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FineTuningResult {
    pub table_name: String,
    pub column_count: usize,
    pub row_count: u64,
    pub improvements: Vec<Improvement>,
    /// Seconds
    pub execution_time: f64,
    #[serde(with = "iso8601")]
    pub timestamp: DateTime<Utc>,
}

impl FineTuningResult {
    pub fn new(
        table_name: impl Into<String>,
        column_count: usize,
        row_count: u64,
        improvements: Vec<Improvement>,
        elapsed: Duration,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            column_count,
            row_count,
            improvements,
            execution_time: elapsed.as_secs_f64(),
            timestamp: Utc::now(),
        }
    }
}

/// RFC 3339 on write; RFC 3339 or naive `YYYY-MM-DDTHH:MM:SS[.f]` (UTC) on read
pub(crate) mod iso8601 {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", raw)))
    }

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}
