use super::types::{Column, ForeignKey};

/// Derive foreign key candidates from column naming conventions.
///
/// Any column ending in `_id` (other than `id` itself) is assumed to
/// reference the table named by stripping the suffix and appending `s`.
/// Known limitation: the pluralization is naive, so `category_id` targets
/// `categorys`; the relationship graph filters out targets that were never
/// discovered, so bad guesses stay invisible to the UI.
///
/// A column can match both the suffix rule and one of the special cases
/// below, in which case both keys are emitted.
pub fn detect_foreign_keys(columns: &[Column]) -> Vec<ForeignKey> {
    let mut foreign_keys = Vec::new();

    for column in columns {
        let name = column.name.to_lowercase();

        // Strip the suffix exactly once: `account_id_id` references
        // `account_ids`, not `accounts`.
        if let Some(base) = name.strip_suffix("_id") {
            let referenced_table = format!("{}s", base);
            foreign_keys.push(ForeignKey {
                column: column.name.clone(),
                referenced_table,
                referenced_column: "id".to_string(),
            });
        }

        // Special cases for audit and ownership columns
        if name == "user_id" || name == "created_by" || name == "updated_by" {
            foreign_keys.push(ForeignKey {
                column: column.name.clone(),
                referenced_table: "user_profiles".to_string(),
                referenced_column: "id".to_string(),
            });
        }

        if name == "organization_id" || name == "org_id" {
            foreign_keys.push(ForeignKey {
                column: column.name.clone(),
                referenced_table: "organizations".to_string(),
                referenced_column: "id".to_string(),
            });
        }
    }

    foreign_keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::discovery::types::ColumnType;

    fn col(name: &str) -> Column {
        Column::new(name, ColumnType::Text, false)
    }

    #[test]
    fn suffix_rule_pluralizes_naively() {
        let fks = detect_foreign_keys(&[col("order_id")]);
        assert_eq!(fks.len(), 1);
        assert_eq!(fks[0].referenced_table, "orders");
        assert_eq!(fks[0].referenced_column, "id");

        // Irregular plurals are not handled.
        let fks = detect_foreign_keys(&[col("category_id")]);
        assert_eq!(fks[0].referenced_table, "categorys");
    }

    #[test]
    fn suffix_is_stripped_once() {
        let fks = detect_foreign_keys(&[col("account_id_id")]);
        assert_eq!(fks.len(), 1);
        assert_eq!(fks[0].referenced_table, "account_ids");
    }

    #[test]
    fn plain_id_is_not_a_foreign_key() {
        assert!(detect_foreign_keys(&[col("id")]).is_empty());
    }

    #[test]
    fn user_id_fires_both_rules() {
        let fks = detect_foreign_keys(&[col("user_id")]);
        assert_eq!(fks.len(), 2);
        assert_eq!(fks[0].referenced_table, "users");
        assert_eq!(fks[1].referenced_table, "user_profiles");
    }

    #[test]
    fn audit_columns_target_user_profiles() {
        let fks = detect_foreign_keys(&[col("created_by"), col("updated_by")]);
        assert_eq!(fks.len(), 2);
        assert!(fks.iter().all(|fk| fk.referenced_table == "user_profiles"));
    }

    #[test]
    fn org_columns_fire_both_rules() {
        let fks = detect_foreign_keys(&[col("org_id")]);
        assert_eq!(fks.len(), 2);
        assert_eq!(fks[0].referenced_table, "orgs");
        assert_eq!(fks[1].referenced_table, "organizations");

        let fks = detect_foreign_keys(&[col("organization_id")]);
        assert_eq!(fks.len(), 2);
        assert_eq!(fks[0].referenced_table, "organizations");
        assert_eq!(fks[1].referenced_table, "organizations");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let fks = detect_foreign_keys(&[col("Project_ID")]);
        assert_eq!(fks.len(), 1);
        assert_eq!(fks[0].column, "Project_ID");
        assert_eq!(fks[0].referenced_table, "projects");
    }
}
