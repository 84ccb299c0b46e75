use super::Improvement;
use crate::catalog::TableSchema;

/// Reserved extension point: no denormalization rules exist yet, so this
/// always returns an empty list.
pub fn recommend(_schema: &TableSchema) -> Vec<Improvement> {
    Vec::new()
}
