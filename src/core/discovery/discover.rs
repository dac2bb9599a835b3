use std::sync::Arc;

use futures::future;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::utils::config::StudioConfig;
use crate::utils::store::StudioStore;

use super::foreign_keys::detect_foreign_keys;
use super::infer::infer_column_type;
use super::types::{Column, Entity, EntitySchema};

/// Probes a candidate table list against an opaque data store and assembles
/// schema and relationship hints for every table that exists and has rows.
pub struct EntityDiscoverer {
    store: Arc<dyn StudioStore>,
    config: StudioConfig,
}

impl EntityDiscoverer {
    pub fn new(store: Arc<dyn StudioStore>, config: StudioConfig) -> Self {
        EntityDiscoverer { store, config }
    }

    /// Fan out one bounded probe per candidate table and join all outcomes.
    /// Probe failures are isolated: a table that errors or comes back empty
    /// is silently dropped, never aborting the rest of the run. Result order
    /// is settle order, not candidate order; callers needing a display order
    /// re-sort via the prioritizer.
    pub async fn discover(&self, cancel: &CancellationToken) -> Vec<Entity> {
        let probes = self
            .config
            .candidate_tables
            .iter()
            .map(|name| self.probe_table(name, cancel));

        let results = future::join_all(probes).await;

        let entities: Vec<Entity> = results
            .into_iter()
            .flatten()
            .filter(|e| e.exists && e.count > 0)
            .collect();

        tracing::info!(
            "Discovered {} entities out of {} candidates",
            entities.len(),
            self.config.candidate_tables.len()
        );
        entities
    }

    /// Probe a single candidate table. Public so callers can refresh one
    /// entity (e.g. for export) without a full discovery run.
    pub async fn probe_table(&self, name: &str, cancel: &CancellationToken) -> Option<Entity> {
        let sample = tokio::select! {
            biased;
            _ = cancel.cancelled() => return None,
            result = self.store.query_table(name, self.config.sample_limit, true) => {
                match result {
                    Ok(sample) => sample,
                    Err(e) => {
                        tracing::debug!("Probe for '{}' failed: {}", name, e);
                        return None;
                    }
                }
            }
        };

        if sample.rows.is_empty() {
            return None;
        }

        let columns = infer_columns(&sample.rows);
        let foreign_keys = detect_foreign_keys(&columns);
        let count = sample.rows.len();

        Some(Entity {
            name: name.to_string(),
            data: sample.rows,
            exists: true,
            count,
            schema: Some(EntitySchema {
                columns,
                primary_key: vec!["id".to_string()],
                foreign_keys,
            }),
        })
    }
}

/// Column types come from the first sampled row; nullability is true when
/// any sampled row holds a null for the column.
fn infer_columns(rows: &[Value]) -> Vec<Column> {
    let Some(first) = rows.first().and_then(|r| r.as_object()) else {
        return Vec::new();
    };

    first
        .iter()
        .map(|(name, value)| {
            let nullable = rows
                .iter()
                .any(|row| row.get(name).map(Value::is_null).unwrap_or(false));
            Column::new(name.clone(), infer_column_type(value), nullable)
        })
        .collect()
}
