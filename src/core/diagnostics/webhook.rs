use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::utils::config::StudioConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub status: u16,
    pub data: Value,
    /// Wall-clock latency of the call in milliseconds.
    pub timing: u64,
}

/// Result of one webhook test. Exactly one of `response` and `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookTest {
    pub url: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<(String, String)>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<WebhookResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookHistoryEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub test: WebhookTest,
}

/// Outbound HTTP seam so tests can run without a live endpoint.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    /// Returns status and parsed JSON body, or a transport/decode error
    /// message.
    async fn send(
        &self,
        url: &str,
        method: &str,
        headers: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<(u16, Value), String>;
}

struct HttpTransport {
    client: reqwest::Client,
}

#[async_trait]
impl WebhookTransport for HttpTransport {
    async fn send(
        &self,
        url: &str,
        method: &str,
        headers: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<(u16, Value), String> {
        let method = reqwest::Method::from_bytes(method.as_bytes())
            .map_err(|_| format!("Unsupported HTTP method: {}", method))?;

        let mut request = self.client.request(method, url);
        for (name, value) in headers {
            request = request.header(name, value);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| e.to_string())?;
        let status = response.status().as_u16();
        let data: Value = response.json().await.map_err(|e| e.to_string())?;
        Ok((status, data))
    }
}

/// Substitute template placeholders ahead of JSON parsing: `{{timestamp}}`
/// becomes the current instant in ISO-8601 form, `{{random}}` a short
/// alphanumeric token, `{{uuid}}` a fresh v4 UUID.
pub fn substitute_template(template: &str) -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();

    template
        .replace(
            "{{timestamp}}",
            &Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        )
        .replace("{{random}}", &token.to_lowercase())
        .replace("{{uuid}}", &Uuid::new_v4().to_string())
}

/// Issues templated webhook test calls and keeps a bounded rolling history
/// of every completed test, success or failure.
pub struct WebhookTester {
    transport: Box<dyn WebhookTransport>,
    user_agent: String,
    history_capacity: usize,
    history: RwLock<VecDeque<WebhookHistoryEntry>>,
}

impl WebhookTester {
    pub fn new(config: &StudioConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_default();
        Self::with_transport(config, Box::new(HttpTransport { client }))
    }

    pub fn with_transport(config: &StudioConfig, transport: Box<dyn WebhookTransport>) -> Self {
        WebhookTester {
            transport,
            user_agent: config.user_agent.clone(),
            history_capacity: config.history_capacity,
            history: RwLock::new(VecDeque::new()),
        }
    }

    /// Run one webhook test. GET requests skip the payload entirely; for
    /// other methods a template that is not valid JSON after substitution
    /// fails with a distinct invalid-payload error instead of being sent.
    pub async fn run_test(
        &self,
        url: &str,
        method: &str,
        raw_payload_template: Option<&str>,
    ) -> WebhookTest {
        let method = method.to_uppercase();

        let payload = if method != "GET" {
            match raw_payload_template.map(|t| serde_json::from_str(&substitute_template(t))) {
                Some(Ok(value)) => Some(value),
                Some(Err(_)) => {
                    let test = WebhookTest {
                        url: url.to_string(),
                        method,
                        headers: None,
                        payload: None,
                        response: None,
                        error: Some("Invalid JSON payload".to_string()),
                    };
                    self.record(test.clone()).await;
                    return test;
                }
                None => None,
            }
        } else {
            None
        };

        let headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), self.user_agent.clone()),
        ];

        let started = std::time::Instant::now();
        let outcome = self
            .transport
            .send(url, &method, &headers, payload.as_ref())
            .await;
        let timing = started.elapsed().as_millis() as u64;

        let test = match outcome {
            Ok((status, data)) => WebhookTest {
                url: url.to_string(),
                method,
                headers: Some(headers),
                payload,
                response: Some(WebhookResponse {
                    status,
                    data,
                    timing,
                }),
                error: None,
            },
            Err(message) => WebhookTest {
                url: url.to_string(),
                method,
                headers: Some(headers),
                payload,
                response: None,
                error: Some(message),
            },
        };

        self.record(test.clone()).await;
        test
    }

    async fn record(&self, test: WebhookTest) {
        let mut history = self.history.write().await;
        history.push_front(WebhookHistoryEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            test,
        });
        history.truncate(self.history_capacity);
    }

    /// History entries, newest first.
    pub async fn history(&self) -> Vec<WebhookHistoryEntry> {
        self.history.read().await.iter().cloned().collect()
    }

    pub async fn clear_history(&self) {
        self.history.write().await.clear();
    }
}
