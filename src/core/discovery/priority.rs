use serde::Serialize;

use super::types::Entity;

const SYSTEM_TABLES: &[&str] = &["user_profiles", "organizations", "teams", "roles", "permissions"];
const USER_TABLES: &[&str] = &["users", "profiles", "accounts", "sessions"];
const CONTENT_TABLES: &[&str] = &["projects", "tasks", "documents", "files", "posts", "pages"];
const ANALYTICS_TABLES: &[&str] = &["events", "analytics", "logs", "metrics", "stats"];

/// Display bucket for a discovered entity. Buckets are checked in
/// declaration order and the first substring match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    System,
    User,
    Content,
    Analytics,
    Unknown,
}

impl EntityKind {
    pub fn weight(self) -> usize {
        match self {
            EntityKind::System => 1,
            EntityKind::User => 2,
            EntityKind::Content => 3,
            EntityKind::Analytics => 4,
            EntityKind::Unknown => 5,
        }
    }
}

pub fn detect_entity_kind(entity_name: &str) -> EntityKind {
    let name = entity_name.to_lowercase();

    if SYSTEM_TABLES.iter().any(|t| name.contains(t)) {
        EntityKind::System
    } else if USER_TABLES.iter().any(|t| name.contains(t)) {
        EntityKind::User
    } else if CONTENT_TABLES.iter().any(|t| name.contains(t)) {
        EntityKind::Content
    } else if ANALYTICS_TABLES.iter().any(|t| name.contains(t)) {
        EntityKind::Analytics
    } else {
        EntityKind::Unknown
    }
}

/// Sort key: bucket weight dominates, row count breaks ties within a bucket.
pub fn entity_priority(entity: &Entity) -> usize {
    detect_entity_kind(&entity.name).weight() * 1000 + entity.count
}

/// Total ordering for display. Stable, so equal keys keep their original
/// relative order.
pub fn sort_entities_by_priority(entities: &[Entity]) -> Vec<Entity> {
    let mut sorted = entities.to_vec();
    sorted.sort_by_key(entity_priority);
    sorted
}
