pub mod discover;
pub mod foreign_keys;
pub mod infer;
pub mod priority;
pub mod queries;
pub mod relationships;
pub mod types;

pub use discover::EntityDiscoverer;
pub use foreign_keys::detect_foreign_keys;
pub use infer::infer_column_type;
pub use priority::{detect_entity_kind, entity_priority, sort_entities_by_priority, EntityKind};
pub use queries::{generate_entity_queries, validate_entity_data};
pub use relationships::entity_relationships;
pub use types::{Column, ColumnType, Entity, EntityRelationship, EntitySchema, ForeignKey};
