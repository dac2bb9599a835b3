use std::sync::Arc;

use salvo::Depot;

use crate::core::diagnostics::connection::ConnectionTester;
use crate::core::diagnostics::webhook::WebhookTester;
use crate::core::discovery::discover::EntityDiscoverer;
use crate::utils::config::{Config, StudioConfig};
use crate::utils::error::AppError;
use crate::utils::store::{PostgresStore, StudioStore};

/// Shared handles for the HTTP layer. Each request gets fresh result
/// objects from the engine; only the webhook history lives across requests.
#[derive(Clone)]
pub struct AppState {
    pub config: StudioConfig,
    pub store: Arc<dyn StudioStore>,
    pub discoverer: Arc<EntityDiscoverer>,
    pub connection_tester: Arc<ConnectionTester>,
    pub webhook_tester: Arc<WebhookTester>,
}

impl AppState {
    pub async fn new(config: &Config, studio: StudioConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn StudioStore> = Arc::new(
            PostgresStore::connect(
                &config.database_url,
                studio.max_connections,
                studio.connect_timeout,
            )
            .await?,
        );
        Ok(Self::with_store(store, studio))
    }

    /// Assemble the engine around any store implementation.
    pub fn with_store(store: Arc<dyn StudioStore>, studio: StudioConfig) -> Self {
        AppState {
            discoverer: Arc::new(EntityDiscoverer::new(store.clone(), studio.clone())),
            connection_tester: Arc::new(ConnectionTester::new(store.clone(), studio.clone())),
            webhook_tester: Arc::new(WebhookTester::new(&studio)),
            config: studio,
            store,
        }
    }
}

pub fn get_app_state(depot: &Depot) -> Result<&AppState, AppError> {
    depot
        .obtain::<AppState>()
        .map_err(|_| AppError::InternalServerError("App state not available".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::diagnostics::connection::{overall_status, ConnectionStatus};
    use crate::utils::store::test_support::StubStore;
    use serde_json::json;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn engine_wiring_end_to_end() {
        let store = StubStore::new()
            .with_table(
                "user_profiles",
                vec![json!({"id": "1", "org_id": "o1"}), json!({"id": "2", "org_id": null})],
            )
            .with_table("organizations", vec![json!({"id": "o1", "name": "Acme"})])
            .with_session("u1");

        let studio = StudioConfig {
            candidate_tables: vec!["user_profiles".into(), "organizations".into(), "ghost".into()],
            test_pacing: Duration::ZERO,
            ..StudioConfig::default()
        };
        let state = AppState::with_store(Arc::new(store), studio);

        let cancel = CancellationToken::new();
        let entities = state.discoverer.discover(&cancel).await;
        assert_eq!(entities.len(), 2);

        let relationships = crate::core::discovery::entity_relationships(&entities);
        assert!(relationships
            .iter()
            .any(|r| r.from_entity == "user_profiles" && r.to_entity == "organizations"));

        let tests = state.connection_tester.run_all_tests(&cancel).await;
        assert_eq!(tests.len(), 4);
        assert_eq!(overall_status(&tests), ConnectionStatus::Connected);
    }
}
