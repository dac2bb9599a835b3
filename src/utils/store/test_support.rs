//! In-memory store stub for unit tests. No database, no network.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use super::{ChannelState, SessionInfo, StoreError, StudioStore, TableSample};

pub struct StubStore {
    tables: HashMap<String, Result<Vec<Value>, StoreError>>,
    session: Result<Option<SessionInfo>, StoreError>,
    channel: Result<ChannelState, StoreError>,
}

impl StubStore {
    pub fn new() -> Self {
        StubStore {
            tables: HashMap::new(),
            session: Ok(None),
            channel: Ok(ChannelState::Subscribed),
        }
    }

    pub fn with_table(mut self, name: &str, rows: Vec<Value>) -> Self {
        self.tables.insert(name.to_string(), Ok(rows));
        self
    }

    pub fn with_error(mut self, name: &str, error: StoreError) -> Self {
        self.tables.insert(name.to_string(), Err(error));
        self
    }

    pub fn with_session(mut self, user_id: &str) -> Self {
        self.session = Ok(Some(SessionInfo {
            user_id: user_id.to_string(),
            expires_at: None,
        }));
        self
    }

    pub fn with_session_error(mut self, error: StoreError) -> Self {
        self.session = Err(error);
        self
    }

    pub fn with_channel_state(mut self, state: ChannelState) -> Self {
        self.channel = Ok(state);
        self
    }

    pub fn with_channel_error(mut self, error: StoreError) -> Self {
        self.channel = Err(error);
        self
    }
}

#[async_trait]
impl StudioStore for StubStore {
    async fn query_table(
        &self,
        table: &str,
        limit: u32,
        _exact_count: bool,
    ) -> Result<TableSample, StoreError> {
        match self.tables.get(table) {
            Some(Ok(rows)) => {
                let bounded: Vec<Value> = rows.iter().take(limit as usize).cloned().collect();
                let total = rows.len() as u64;
                Ok(TableSample {
                    rows: bounded,
                    total: Some(total),
                })
            }
            Some(Err(e)) => Err(e.clone()),
            None => Err(StoreError::Query(format!(
                "relation \"{}\" does not exist",
                table
            ))),
        }
    }

    async fn current_session(&self) -> Result<Option<SessionInfo>, StoreError> {
        self.session.clone()
    }

    async fn subscribe_changes(&self, _channel: &str) -> Result<ChannelState, StoreError> {
        self.channel.clone()
    }
}
