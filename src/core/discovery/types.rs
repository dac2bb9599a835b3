use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Semantic type tag inferred for a sampled column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Numeric,
    Integer,
    Boolean,
    Timestamp,
    Uuid,
    Json,
    Array,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType, nullable: bool) -> Self {
        Column {
            name: name.into(),
            column_type,
            nullable,
            default_value: None,
            description: None,
        }
    }
}

/// A relationship hint derived from column naming conventions. The referenced
/// table is a guess; nothing verifies it exists until the relationship graph
/// filters against discovered entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    pub column: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySchema {
    pub columns: Vec<Column>,
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
}

/// One discovered table/view with its bounded data sample and inferred schema.
///
/// Invariant: `data.len() == count` whenever `schema` is present, and an
/// entity only appears in discovery output when `exists && count > 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub name: String,
    pub data: Vec<Value>,
    pub exists: bool,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<EntitySchema>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRelationship {
    pub from_entity: String,
    pub to_entity: String,
    #[serde(rename = "type")]
    pub relationship_type: String,
    pub foreign_key: String,
    pub referenced_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}
