use std::collections::HashSet;

use super::types::{Entity, EntityRelationship};

/// Cross-reference discovered entities' foreign keys into a flat
/// relationship list. A foreign key pointing at a table that was not
/// discovered yields no relationship; the UI should never claim a link it
/// cannot verify.
pub fn entity_relationships(entities: &[Entity]) -> Vec<EntityRelationship> {
    let discovered: HashSet<&str> = entities.iter().map(|e| e.name.as_str()).collect();
    let mut relationships = Vec::new();

    for entity in entities {
        let Some(schema) = &entity.schema else {
            continue;
        };
        for fk in &schema.foreign_keys {
            if discovered.contains(fk.referenced_table.as_str()) {
                relationships.push(EntityRelationship {
                    from_entity: entity.name.clone(),
                    to_entity: fk.referenced_table.clone(),
                    relationship_type: "many-to-one".to_string(),
                    foreign_key: fk.column.clone(),
                    referenced_key: fk.referenced_column.clone(),
                });
            }
        }
    }

    relationships
}
