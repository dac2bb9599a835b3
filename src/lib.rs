// Studio backend library: dynamic schema discovery and diagnostics engine
// for the admin dashboard, plus its HTTP surface.

pub mod api;
pub mod core;
pub mod utils;

pub use crate::core::diagnostics::connection::{
    overall_status, ConnectionStatus, ConnectionTest, ConnectionTester,
};
pub use crate::core::diagnostics::webhook::{WebhookHistoryEntry, WebhookTest, WebhookTester};
pub use crate::core::discovery::{
    detect_foreign_keys, entity_relationships, infer_column_type, sort_entities_by_priority,
    Column, ColumnType, Entity, EntityDiscoverer, EntityRelationship, EntitySchema, ForeignKey,
};
pub use utils::store::{PostgresStore, StoreError, StudioStore};
pub use utils::{AppError, AppState, Config, StudioConfig};
