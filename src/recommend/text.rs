use super::Improvement;
use crate::catalog::{ColumnInfo, ColumnKind};
use crate::config::TunerConfig;
use crate::profiler::ColumnProfile;
use crate::reducer::{word_count, TextReducer};
use tracing::warn;

/// `100 - round(optimized / original * 100)`
pub fn percent_saved(original_words: usize, optimized_words: usize) -> i64 {
    if original_words == 0 {
        return 0;
    }
    100 - (optimized_words as f64 / original_words as f64 * 100.0).round() as i64
}

/// Estimate token savings for a long text column; never applied
pub fn token_reduction(
    table: &str,
    column: &ColumnInfo,
    profile: &ColumnProfile,
    reducer: &dyn TextReducer,
    config: &TunerConfig,
) -> Option<Improvement> {
    if column.is_key() || column.kind() != ColumnKind::Text {
        return None;
    }
    let average = profile.average_sample_length()?;
    if average <= config.long_text_threshold as f64 {
        return None;
    }

    let mut original = 0usize;
    let mut optimized = 0usize;
    for sample in &profile.samples {
        match reducer.reduce(sample) {
            Ok(reduced) => {
                original += word_count(sample);
                optimized += word_count(&reduced);
            }
            Err(e) => {
                warn!("Text reduction failed for {}.{}: {}", table, column.name, e);
                return None;
            }
        }
    }

    if original == 0 || optimized >= original {
        return None;
    }
    let reduction = (original - optimized) as f64 / original as f64 * 100.0;
    if reduction <= config.token_reduction_min_percent {
        return None;
    }

    Some(Improvement::new(format!(
        "Text column '{}' could save {}% of tokens with text reduction ({} -> {} words over {} samples)",
        column.name,
        percent_saved(original, optimized),
        original,
        optimized,
        profile.sample_count()
    )))
}
