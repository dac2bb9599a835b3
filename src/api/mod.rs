pub mod diagnostics;
pub mod entities;

use salvo::prelude::*;

/// Studio API router. All routes assume `AppState` has been injected.
pub fn api_routes() -> Router {
    Router::with_path("/api/studio")
        .push(Router::with_path("/entities").get(entities::list_entities))
        .push(
            Router::with_path("/entities/{entity_name}/export").get(entities::export_entity),
        )
        .push(
            Router::with_path("/entities/{entity_name}/validation")
                .get(entities::validate_entity),
        )
        .push(
            Router::with_path("/tests/connection")
                .post(diagnostics::run_connection_tests)
                .push(Router::with_path("/progress").get(diagnostics::connection_test_progress)),
        )
        .push(Router::with_path("/webhooks/test").post(diagnostics::run_webhook_test))
        .push(
            Router::with_path("/webhooks/history")
                .get(diagnostics::webhook_history)
                .delete(diagnostics::clear_webhook_history)
                .push(Router::with_path("/export").get(diagnostics::export_webhook_history)),
        )
}
