use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::utils::config::StudioConfig;
use crate::utils::store::{ChannelState, StoreError, StudioStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Error,
    Testing,
    Unknown,
    /// Aggregate-only: some probes connected, some did not.
    Warning,
}

/// Outcome of one service probe. Always a complete result; probe failures
/// land in `error_message`, never as a propagated error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTest {
    pub service: String,
    pub status: ConnectionStatus,
    pub last_tested: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ConnectionTest {
    fn connected(service: &str, started: Instant) -> Self {
        ConnectionTest {
            service: service.to_string(),
            status: ConnectionStatus::Connected,
            last_tested: Utc::now(),
            latency: Some(started.elapsed().as_millis() as u64),
            error_message: None,
        }
    }

    fn error(service: &str, started: Instant, message: impl Into<String>) -> Self {
        ConnectionTest {
            service: service.to_string(),
            status: ConnectionStatus::Error,
            last_tested: Utc::now(),
            latency: Some(started.elapsed().as_millis() as u64),
            error_message: Some(message.into()),
        }
    }
}

/// Overall status across a test run: connected when every probe connected,
/// warning when only some did, error when none did, unknown for an empty
/// run.
pub fn overall_status(tests: &[ConnectionTest]) -> ConnectionStatus {
    if tests.is_empty() {
        return ConnectionStatus::Unknown;
    }
    let connected = tests
        .iter()
        .filter(|t| t.status == ConnectionStatus::Connected)
        .count();
    if connected == tests.len() {
        ConnectionStatus::Connected
    } else if connected > 0 {
        ConnectionStatus::Warning
    } else {
        ConnectionStatus::Error
    }
}

/// Runs the fixed probe sequence strictly in order, publishing progress
/// between probes. Sequential on purpose: ordering of diagnostic output and
/// paced progress feedback matter more than wall-clock speed here.
pub struct ConnectionTester {
    store: Arc<dyn StudioStore>,
    config: StudioConfig,
    progress: watch::Sender<f32>,
}

const PROBE_SERVICES: &[&str] = &["database", "authentication", "access_control", "realtime"];

impl ConnectionTester {
    pub fn new(store: Arc<dyn StudioStore>, config: StudioConfig) -> Self {
        let (progress, _) = watch::channel(0.0);
        ConnectionTester {
            store,
            config,
            progress,
        }
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<f32> {
        self.progress.subscribe()
    }

    pub fn progress(&self) -> f32 {
        *self.progress.borrow()
    }

    pub async fn run_all_tests(&self, cancel: &CancellationToken) -> Vec<ConnectionTest> {
        let total = PROBE_SERVICES.len();
        let mut results = Vec::with_capacity(total);
        let _ = self.progress.send_replace(0.0);

        for (index, service) in PROBE_SERVICES.iter().enumerate() {
            if cancel.is_cancelled() {
                break;
            }
            let _ = self.progress.send_replace((index as f32 / total as f32) * 100.0);

            let result = match *service {
                "database" => self.test_database().await,
                "authentication" => self.test_authentication().await,
                "access_control" => self.test_access_control().await,
                "realtime" => self.test_realtime().await,
                other => ConnectionTest::error(other, Instant::now(), "Unknown probe"),
            };
            tracing::info!(
                "Connection probe '{}' finished: {:?}",
                result.service,
                result.status
            );
            results.push(result);

            // Paces UI progress feedback between probes.
            tokio::time::sleep(self.config.test_pacing).await;
        }

        let _ = self.progress.send_replace(100.0);
        results
    }

    async fn test_database(&self) -> ConnectionTest {
        let started = Instant::now();
        match self.store.query_table(&self.config.probe_table, 1, false).await {
            Ok(_) => ConnectionTest::connected("database", started),
            Err(e) => ConnectionTest::error("database", started, e.to_string()),
        }
    }

    async fn test_authentication(&self) -> ConnectionTest {
        let started = Instant::now();
        match self.store.current_session().await {
            Ok(Some(_)) => ConnectionTest::connected("authentication", started),
            Ok(None) => ConnectionTest::error("authentication", started, "No active session"),
            Err(e) => ConnectionTest::error("authentication", started, e.to_string()),
        }
    }

    /// Access denial on a protected table means the control is enforced, so
    /// it maps to connected rather than error.
    async fn test_access_control(&self) -> ConnectionTest {
        let started = Instant::now();
        match self.store.query_table(&self.config.probe_table, 1, false).await {
            Ok(_) => ConnectionTest::connected("access_control", started),
            Err(StoreError::AccessDenied(_)) => ConnectionTest::connected("access_control", started),
            Err(e) => ConnectionTest::error("access_control", started, e.to_string()),
        }
    }

    async fn test_realtime(&self) -> ConnectionTest {
        let started = Instant::now();
        match self
            .store
            .subscribe_changes(&self.config.realtime_channel)
            .await
        {
            Ok(ChannelState::Subscribed) => ConnectionTest::connected("realtime", started),
            Ok(state) => ConnectionTest::error(
                "realtime",
                started,
                format!("Channel state: {}", state),
            ),
            Err(e) => ConnectionTest::error("realtime", started, e.to_string()),
        }
    }
}
