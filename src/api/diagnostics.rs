use salvo::prelude::*;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::core::diagnostics::connection::{overall_status, ConnectionStatus, ConnectionTest};
use crate::utils::export::export_history_json;
use crate::utils::{get_app_state, AppError};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionTestResponse {
    overall: ConnectionStatus,
    tests: Vec<ConnectionTest>,
}

/// Run the full sequential probe suite and report per-service results plus
/// the aggregate status.
#[handler]
pub async fn run_connection_tests(res: &mut Response, depot: &mut Depot) -> Result<(), AppError> {
    let state = get_app_state(depot)?;
    let cancel = CancellationToken::new();

    let tests = state.connection_tester.run_all_tests(&cancel).await;
    let overall = overall_status(&tests);

    res.render(Json(ConnectionTestResponse { overall, tests }));
    Ok(())
}

/// Progress percentage of the connection test run currently in flight (or
/// the last completed one).
#[handler]
pub async fn connection_test_progress(
    res: &mut Response,
    depot: &mut Depot,
) -> Result<(), AppError> {
    let state = get_app_state(depot)?;
    res.render(Json(serde_json::json!({
        "progress": state.connection_tester.progress()
    })));
    Ok(())
}

#[derive(Deserialize)]
struct WebhookTestRequest {
    url: String,
    #[serde(default = "default_method")]
    method: String,
    payload: Option<String>,
}

fn default_method() -> String {
    "POST".to_string()
}

/// Fire one templated webhook test and return the captured result.
#[handler]
pub async fn run_webhook_test(
    req: &mut Request,
    res: &mut Response,
    depot: &mut Depot,
) -> Result<(), AppError> {
    let state = get_app_state(depot)?;
    let request: WebhookTestRequest = req
        .parse_json()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON: {}", e)))?;

    if request.url.is_empty() {
        return Err(AppError::BadRequest("Webhook URL is required".to_string()));
    }

    let result = state
        .webhook_tester
        .run_test(&request.url, &request.method, request.payload.as_deref())
        .await;

    res.render(Json(result));
    Ok(())
}

/// Webhook test history, newest first, bounded to the configured capacity.
#[handler]
pub async fn webhook_history(res: &mut Response, depot: &mut Depot) -> Result<(), AppError> {
    let state = get_app_state(depot)?;
    res.render(Json(state.webhook_tester.history().await));
    Ok(())
}

#[handler]
pub async fn clear_webhook_history(res: &mut Response, depot: &mut Depot) -> Result<(), AppError> {
    let state = get_app_state(depot)?;
    state.webhook_tester.clear_history().await;
    res.render(Json(serde_json::json!({"cleared": true})));
    Ok(())
}

/// History as a downloadable pretty-JSON document.
#[handler]
pub async fn export_webhook_history(
    res: &mut Response,
    depot: &mut Depot,
) -> Result<(), AppError> {
    let state = get_app_state(depot)?;
    let history = state.webhook_tester.history().await;
    let content = export_history_json(&history)?;

    let filename = format!(
        "webhook-history-{}.json",
        chrono::Utc::now().format("%Y-%m-%d")
    );
    let disposition = format!("attachment; filename=\"{}\"", filename);
    if let Ok(cd) = disposition.parse() {
        res.headers_mut().insert("Content-Disposition", cd);
    }
    res.render(Text::Json(content));
    Ok(())
}
