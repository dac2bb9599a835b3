use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use super::types::ColumnType;

lazy_static! {
    static ref ISO_DATE_PREFIX: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap();
    static ref UUID_PATTERN: Regex = Regex::new(
        r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$"
    )
    .unwrap();
}

/// Infer the semantic column type of a single sampled value.
///
/// Pure and total: every JSON value maps to exactly one of the nine tags.
/// String checks run in priority order: timestamp, then UUID, then text.
pub fn infer_column_type(value: &Value) -> ColumnType {
    match value {
        Value::Null => ColumnType::Unknown,
        Value::String(s) => {
            if ISO_DATE_PREFIX.is_match(s) || (s.contains('T') && s.contains('Z')) {
                ColumnType::Timestamp
            } else if UUID_PATTERN.is_match(s) {
                ColumnType::Uuid
            } else {
                ColumnType::Text
            }
        }
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                ColumnType::Integer
            } else if n.as_f64().map(|f| f.fract() == 0.0).unwrap_or(false) {
                // Whole-valued floats count as integers, matching how the
                // sampled JSON does not distinguish 5 from 5.0.
                ColumnType::Integer
            } else {
                ColumnType::Numeric
            }
        }
        Value::Bool(_) => ColumnType::Boolean,
        Value::Array(_) => ColumnType::Array,
        Value::Object(_) => ColumnType::Json,
    }
}
