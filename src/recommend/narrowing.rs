use super::Improvement;
use crate::catalog::{ColumnInfo, ColumnKind};
use crate::profiler::ColumnProfile;

/// Byte-width type an integer range fits into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteWidth {
    Unsigned,
    Signed,
}

impl ByteWidth {
    pub fn type_name(self) -> &'static str {
        match self {
            ByteWidth::Unsigned => "TINYINT UNSIGNED",
            ByteWidth::Signed => "TINYINT",
        }
    }
}

/// The unsigned range is checked first, so `[0, 127]` reports unsigned.
pub fn byte_width_for(min: f64, max: f64) -> Option<ByteWidth> {
    if min >= 0.0 && max < 256.0 {
        Some(ByteWidth::Unsigned)
    } else if min >= -128.0 && max < 128.0 {
        Some(ByteWidth::Signed)
    } else {
        None
    }
}

pub fn narrow_integer(column: &ColumnInfo, profile: &ColumnProfile) -> Option<Improvement> {
    if column.is_key() || column.kind() != ColumnKind::Integer || !profile.is_integral() {
        return None;
    }
    if column.declared_type.to_ascii_uppercase().starts_with("TINYINT") {
        return None;
    }
    let (min, max) = (profile.min_value?, profile.max_value?);
    let width = byte_width_for(min, max)?;

    Some(Improvement::new(format!(
        "Column '{}' could use {} instead of {} (values {}..{})",
        column.name,
        width.type_name(),
        column.declared_type,
        min as i64,
        max as i64
    )))
}

/// Bounded-length suggestion at twice the longest sampled value
pub fn narrow_text(column: &ColumnInfo, profile: &ColumnProfile, ceiling: usize) -> Option<Improvement> {
    if column.is_key() || column.kind() != ColumnKind::Text || column.declared_type.contains('(') {
        return None;
    }
    let longest = profile.max_sample_length()?;
    if longest >= ceiling {
        return None;
    }
    let bound = (longest * 2).max(1);

    Some(Improvement::new(format!(
        "Column '{}' could use VARCHAR({}) instead of {} (longest sampled value: {} chars)",
        column.name, bound, column.declared_type, longest
    )))
}
