pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

pub use postgres::{build_connection_string, PostgresStore};

/// Errors surfaced by a data store. Access denial is its own variant
/// because the access-control probe treats it as evidence the control is
/// enforced, not as a failure.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("data store unavailable: {0}")]
    Unavailable(String),
}

/// Bounded result of probing one table: up to `limit` rows as JSON objects,
/// plus the exact total row count when the caller asked for one and the
/// store supports it.
#[derive(Debug, Clone, Default)]
pub struct TableSample {
    pub rows: Vec<Value>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub user_id: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Observed state of a change-notification channel after a subscribe
/// attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Subscribed,
    Closed,
    Errored,
}

impl std::fmt::Display for ChannelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelState::Subscribed => write!(f, "SUBSCRIBED"),
            ChannelState::Closed => write!(f, "CLOSED"),
            ChannelState::Errored => write!(f, "ERRORED"),
        }
    }
}

#[cfg(test)]
pub mod test_support;

/// Generic query capability over whatever relational backend the studio is
/// pointed at. The engine never assumes a schema contract; it only probes.
#[async_trait]
pub trait StudioStore: Send + Sync {
    /// Fetch up to `limit` rows from a named table. `exact_count` requests
    /// the true total row count alongside the sample where the backend
    /// supports it.
    async fn query_table(
        &self,
        table: &str,
        limit: u32,
        exact_count: bool,
    ) -> Result<TableSample, StoreError>;

    /// Current authenticated session, if one exists.
    async fn current_session(&self) -> Result<Option<SessionInfo>, StoreError>;

    /// Subscribe to a change-notification channel, observe its state, and
    /// tear the subscription down again.
    async fn subscribe_changes(&self, channel: &str) -> Result<ChannelState, StoreError>;
}
