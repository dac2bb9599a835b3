use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::core::diagnostics::webhook::WebhookHistoryEntry;
use crate::core::discovery::types::Entity;
use crate::utils::error::AppError;

/// Serialize an entity's sampled rows as pretty JSON.
pub fn export_entity_json(entity: &Entity) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(&entity.data)?)
}

/// Serialize an entity's sampled rows as CSV. Headers come from the first
/// row; fields containing a comma or double-quote are wrapped in quotes
/// with internal quotes doubled.
pub fn export_entity_csv(entity: &Entity) -> Result<String, AppError> {
    let Some(first) = entity.data.first().and_then(|r| r.as_object()) else {
        return Ok(String::new());
    };
    let headers: Vec<String> = first.keys().cloned().collect();

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer
        .write_record(&headers)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    for row in &entity.data {
        let record: Vec<String> = headers
            .iter()
            .map(|header| csv_field(row.get(header).unwrap_or(&Value::Null)))
            .collect();
        writer
            .write_record(&record)
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| AppError::InternalServerError(e.to_string()))
}

fn csv_field(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn export_history_json(history: &[WebhookHistoryEntry]) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(history)?)
}

/// `{entity}_export_{YYYY-MM-DD}.{ext}`
pub fn generate_entity_filename(entity_name: &str, format: &str) -> String {
    format!(
        "{}_export_{}.{}",
        entity_name,
        Utc::now().format("%Y-%m-%d"),
        format
    )
}

/// Human-oriented rendering of one cell for the grid view.
pub fn format_value(value: &Value, key: &str) -> String {
    match value {
        Value::Null => "—".to_string(),
        Value::Bool(true) => "✓".to_string(),
        Value::Bool(false) => "✗".to_string(),
        Value::Object(_) | Value::Array(_) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        Value::String(s) => {
            let lower = key.to_lowercase();
            if lower.contains("date") || lower.contains("time") {
                format_date(s)
            } else if s.chars().count() > 50 {
                let truncated: String = s.chars().take(50).collect();
                format!("{}...", truncated)
            } else {
                s.clone()
            }
        }
        other => other.to_string(),
    }
}

/// `MM/DD/YYYY, HH:MM` for parseable timestamps, the raw string otherwise.
pub fn format_date(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(date) => date.format("%m/%d/%Y, %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Mask a credential for display: short values are fully hidden, longer
/// ones keep a recognizable prefix and suffix.
pub fn mask_sensitive_value(value: Option<&str>, show: bool) -> String {
    let Some(value) = value else {
        return "Not set".to_string();
    };
    if show {
        return value.to_string();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 12 {
        return "***".to_string();
    }
    let prefix: String = chars[..8].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", prefix, suffix)
}

/// `row_level_security` -> `Row Level Security`
pub fn format_service_name(service: &str) -> String {
    service
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entity_with_rows(rows: Vec<Value>) -> Entity {
        Entity {
            name: "tasks".to_string(),
            count: rows.len(),
            data: rows,
            exists: true,
            schema: None,
        }
    }

    #[test]
    fn csv_quotes_commas_and_doubles_quotes() {
        let entity = entity_with_rows(vec![json!({
            "id": 1,
            "note": "hello, world",
            "title": "say \"hi\""
        })]);
        let csv = export_entity_csv(&entity).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next().unwrap(), "id,note,title");
        assert_eq!(lines.next().unwrap(), "1,\"hello, world\",\"say \"\"hi\"\"\"");
    }

    #[test]
    fn csv_headers_keep_column_order() {
        // Row order, not alphabetical order.
        let entity = entity_with_rows(vec![json!({
            "zeta": 1,
            "alpha": 2,
            "mid": 3
        })]);
        let csv = export_entity_csv(&entity).unwrap();
        assert_eq!(csv.lines().next().unwrap(), "zeta,alpha,mid");
    }

    #[test]
    fn csv_renders_null_as_empty_field() {
        let entity = entity_with_rows(vec![
            json!({"a": "x", "b": null}),
            json!({"a": null, "b": "y"}),
        ]);
        let csv = export_entity_csv(&entity).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines, vec!["a,b", "x,", ",y"]);
    }

    #[test]
    fn csv_of_empty_entity_is_empty() {
        let entity = entity_with_rows(vec![]);
        assert_eq!(export_entity_csv(&entity).unwrap(), "");
    }

    #[test]
    fn json_export_round_trips() {
        let entity = entity_with_rows(vec![json!({"id": 1})]);
        let exported = export_entity_json(&entity).unwrap();
        let parsed: Value = serde_json::from_str(&exported).unwrap();
        assert_eq!(parsed, json!([{"id": 1}]));
    }

    #[test]
    fn filename_carries_date_and_extension() {
        let name = generate_entity_filename("tasks", "csv");
        assert!(name.starts_with("tasks_export_"));
        assert!(name.ends_with(".csv"));
    }

    #[test]
    fn format_value_cases() {
        assert_eq!(format_value(&Value::Null, "x"), "—");
        assert_eq!(format_value(&json!(true), "x"), "✓");
        assert_eq!(format_value(&json!(false), "x"), "✗");
        assert_eq!(format_value(&json!(7), "x"), "7");

        let long = "a".repeat(60);
        let formatted = format_value(&json!(long), "x");
        assert_eq!(formatted.chars().count(), 53);
        assert!(formatted.ends_with("..."));

        let date = format_value(&json!("2024-03-05T09:30:00Z"), "updated_time");
        assert_eq!(date, "03/05/2024, 09:30");
        // Keys without a date/time hint keep the raw string.
        assert_eq!(
            format_value(&json!("2024-03-05T09:30:00Z"), "created_at"),
            "2024-03-05T09:30:00Z"
        );
    }

    #[test]
    fn mask_sensitive_values() {
        assert_eq!(mask_sensitive_value(None, false), "Not set");
        assert_eq!(mask_sensitive_value(Some("short"), false), "***");
        assert_eq!(
            mask_sensitive_value(Some("sk_live_abcdef123456"), false),
            "sk_live_...3456"
        );
        assert_eq!(mask_sensitive_value(Some("short"), true), "short");
    }

    #[test]
    fn service_names_title_case() {
        assert_eq!(format_service_name("row_level_security"), "Row Level Security");
        assert_eq!(format_service_name("database"), "Database");
    }
}
