use std::collections::BTreeMap;

use super::types::{Entity, EntityValidation};

fn has_column(entity: &Entity, name: &str) -> bool {
    entity
        .schema
        .as_ref()
        .map(|s| s.columns.iter().any(|c| c.name == name))
        .unwrap_or(false)
}

/// Suggested starting queries for one discovered entity, keyed by a short
/// label. Column-dependent suggestions only appear when the sampled schema
/// actually carries the column.
pub fn generate_entity_queries(entity: &Entity) -> BTreeMap<String, String> {
    let mut queries = BTreeMap::new();

    queries.insert(
        "select_all".to_string(),
        format!("SELECT * FROM {} LIMIT 100;", entity.name),
    );
    queries.insert(
        "count".to_string(),
        format!("SELECT COUNT(*) FROM {};", entity.name),
    );

    if has_column(entity, "created_at") {
        queries.insert(
            "recent".to_string(),
            format!(
                "SELECT * FROM {} ORDER BY created_at DESC LIMIT 10;",
                entity.name
            ),
        );
        queries.insert(
            "today".to_string(),
            format!(
                "SELECT * FROM {} WHERE created_at >= CURRENT_DATE;",
                entity.name
            ),
        );
    }

    if has_column(entity, "status") {
        queries.insert(
            "by_status".to_string(),
            format!(
                "SELECT status, COUNT(*) as count FROM {} GROUP BY status;",
                entity.name
            ),
        );
    }

    if has_column(entity, "user_id") {
        queries.insert(
            "by_user".to_string(),
            format!(
                "SELECT user_id, COUNT(*) as count FROM {} GROUP BY user_id ORDER BY count DESC LIMIT 10;",
                entity.name
            ),
        );
    }

    queries
}

/// Structural sanity check on a discovered entity before it is exported or
/// rendered.
pub fn validate_entity_data(entity: &Entity) -> EntityValidation {
    let mut errors = Vec::new();

    if entity.name.is_empty() {
        errors.push("Entity name is required".to_string());
    }

    if entity.data.len() != entity.count {
        errors.push(format!(
            "Entity count ({}) does not match data length ({})",
            entity.count,
            entity.data.len()
        ));
    }

    if let Some(first_row) = entity.data.first() {
        let has_id = first_row
            .as_object()
            .map(|row| row.contains_key("id"))
            .unwrap_or(false);
        if !has_id {
            errors.push("Entity data should have an 'id' field".to_string());
        }
    }

    EntityValidation {
        is_valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::discovery::types::{Column, ColumnType, EntitySchema};
    use serde_json::json;

    fn entity_with_columns(name: &str, columns: &[&str]) -> Entity {
        Entity {
            name: name.to_string(),
            data: vec![],
            exists: true,
            count: 0,
            schema: Some(EntitySchema {
                columns: columns
                    .iter()
                    .map(|c| Column::new(*c, ColumnType::Text, false))
                    .collect(),
                primary_key: vec!["id".to_string()],
                foreign_keys: vec![],
            }),
        }
    }

    #[test]
    fn base_queries_always_present() {
        let queries = generate_entity_queries(&entity_with_columns("tasks", &["id"]));
        assert_eq!(
            queries.get("select_all").unwrap(),
            "SELECT * FROM tasks LIMIT 100;"
        );
        assert_eq!(queries.get("count").unwrap(), "SELECT COUNT(*) FROM tasks;");
        assert!(!queries.contains_key("recent"));
        assert!(!queries.contains_key("by_status"));
        assert!(!queries.contains_key("by_user"));
    }

    #[test]
    fn column_gated_queries() {
        let entity = entity_with_columns("tasks", &["id", "created_at", "status", "user_id"]);
        let queries = generate_entity_queries(&entity);
        assert!(queries.contains_key("recent"));
        assert!(queries.contains_key("today"));
        assert!(queries.contains_key("by_status"));
        assert!(queries.contains_key("by_user"));
    }

    #[test]
    fn validation_flags_count_mismatch() {
        let mut entity = entity_with_columns("tasks", &["id"]);
        entity.data = vec![json!({"id": "1"})];
        entity.count = 2;
        let validation = validate_entity_data(&entity);
        assert!(!validation.is_valid);
        assert!(validation.errors[0].contains("does not match"));
    }

    #[test]
    fn validation_flags_missing_id() {
        let mut entity = entity_with_columns("tasks", &["name"]);
        entity.data = vec![json!({"name": "no id here"})];
        entity.count = 1;
        let validation = validate_entity_data(&entity);
        assert!(!validation.is_valid);
        assert!(validation.errors.iter().any(|e| e.contains("'id'")));
    }

    #[test]
    fn valid_entity_passes() {
        let mut entity = entity_with_columns("tasks", &["id"]);
        entity.data = vec![json!({"id": "1"})];
        entity.count = 1;
        assert!(validate_entity_data(&entity).is_valid);
    }
}
