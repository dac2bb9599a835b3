pub mod connection;
pub mod webhook;

pub use connection::{overall_status, ConnectionStatus, ConnectionTest, ConnectionTester};
pub use webhook::{WebhookHistoryEntry, WebhookTest, WebhookTester};
