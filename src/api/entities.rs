use salvo::prelude::*;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use crate::core::diagnostics::connection::ConnectionStatus;
use crate::core::discovery::{
    entity_relationships, generate_entity_queries, sort_entities_by_priority, validate_entity_data,
    Entity, EntityRelationship,
};
use crate::utils::export::{export_entity_csv, export_entity_json, generate_entity_filename};
use crate::utils::store::StoreError;
use crate::utils::{get_app_state, AppError, AppState};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StudioEntitiesResponse {
    entities: Vec<Entity>,
    relationships: Vec<EntityRelationship>,
    queries: Map<String, Value>,
    connection_status: ConnectionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
}

/// Run a discovery pass and return the prioritized entity list with its
/// relationship graph. A store that is unreachable outright surfaces as a
/// run-level connection status, never as a failed request.
#[handler]
pub async fn list_entities(res: &mut Response, depot: &mut Depot) -> Result<(), AppError> {
    let state = get_app_state(depot)?;
    let cancel = CancellationToken::new();

    let entities = state.discoverer.discover(&cancel).await;
    let (connection_status, error_message) = run_status(state, &entities).await;

    let relationships = entity_relationships(&entities);
    let entities = sort_entities_by_priority(&entities);

    let mut queries = Map::new();
    for entity in &entities {
        let suggestions: Map<String, Value> = generate_entity_queries(entity)
            .into_iter()
            .map(|(label, sql)| (label, Value::String(sql)))
            .collect();
        queries.insert(entity.name.clone(), Value::Object(suggestions));
    }

    res.render(Json(StudioEntitiesResponse {
        entities,
        relationships,
        queries,
        connection_status,
        error_message,
    }));
    Ok(())
}

/// Distinguish "nothing discovered because the store is down" from "nothing
/// discovered because no candidate table matched".
async fn run_status(
    state: &AppState,
    entities: &[Entity],
) -> (ConnectionStatus, Option<String>) {
    if !entities.is_empty() {
        return (ConnectionStatus::Connected, None);
    }
    match state.store.query_table(&state.config.probe_table, 1, false).await {
        Ok(_) | Err(StoreError::AccessDenied(_)) | Err(StoreError::Query(_)) => {
            (ConnectionStatus::Connected, None)
        }
        Err(e @ StoreError::Unavailable(_)) => {
            tracing::warn!("Discovery ran against an unreachable store: {}", e);
            (ConnectionStatus::Error, Some(e.to_string()))
        }
    }
}

/// Only tables on the candidate list are addressable by name; anything else
/// is reported as undiscovered without touching the store.
fn require_candidate(config: &crate::utils::StudioConfig, name: &str) -> Result<(), AppError> {
    if config.candidate_tables.iter().any(|t| t == name) {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("Entity '{}' not discovered", name)))
    }
}

/// Export one discovered entity's sampled rows as JSON or CSV.
#[handler]
pub async fn export_entity(
    req: &mut Request,
    res: &mut Response,
    depot: &mut Depot,
) -> Result<(), AppError> {
    let state = get_app_state(depot)?;
    let entity_name = req
        .param::<String>("entity_name")
        .ok_or_else(|| AppError::BadRequest("Missing entity_name".to_string()))?;
    let format = req
        .query::<String>("format")
        .unwrap_or_else(|| "json".to_string());
    require_candidate(&state.config, &entity_name)?;

    let cancel = CancellationToken::new();
    let entity = state
        .discoverer
        .probe_table(&entity_name, &cancel)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Entity '{}' not discovered", entity_name)))?;

    let filename = generate_entity_filename(&entity_name, &format);
    let disposition = format!("attachment; filename=\"{}\"", filename);
    if let Ok(cd) = disposition.parse() {
        res.headers_mut().insert("Content-Disposition", cd);
    }

    match format.as_str() {
        "json" => res.render(Text::Json(export_entity_json(&entity)?)),
        "csv" => res.render(Text::Csv(export_entity_csv(&entity)?)),
        other => {
            return Err(AppError::BadRequest(format!(
                "Unsupported export format: {}",
                other
            )))
        }
    }
    Ok(())
}

/// Structural validation of one discovered entity.
#[handler]
pub async fn validate_entity(
    req: &mut Request,
    res: &mut Response,
    depot: &mut Depot,
) -> Result<(), AppError> {
    let state = get_app_state(depot)?;
    let entity_name = req
        .param::<String>("entity_name")
        .ok_or_else(|| AppError::BadRequest("Missing entity_name".to_string()))?;
    require_candidate(&state.config, &entity_name)?;

    let cancel = CancellationToken::new();
    let entity = state
        .discoverer
        .probe_table(&entity_name, &cancel)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Entity '{}' not discovered", entity_name)))?;

    res.render(Json(validate_entity_data(&entity)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::StudioConfig;

    #[test]
    fn only_candidate_tables_are_addressable() {
        let config = StudioConfig::default();
        assert!(require_candidate(&config, "users").is_ok());
        assert!(matches!(
            require_candidate(&config, "pg_shadow"),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            require_candidate(&config, "secret_ledger"),
            Err(AppError::NotFound(_))
        ));
    }
}
