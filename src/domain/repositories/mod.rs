use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::models::{BroadcastMessage, Recipient};

/// Persistence for scheduled broadcasts.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// All unsent messages whose scheduled time has passed, ordered by
    /// scheduled time ascending.
    async fn fetch_due(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<BroadcastMessage>>;

    /// Mark a message as sent. Idempotent: marking an already-sent
    /// message is a no-op, not an error.
    async fn mark_sent(&self, message_id: i64) -> anyhow::Result<()>;
}

/// Read access to the recipient directory.
#[async_trait]
pub trait RecipientDirectory: Send + Sync {
    /// Snapshot of every recipient currently eligible for broadcasts.
    /// Blocked recipients are excluded.
    async fn snapshot(&self) -> anyhow::Result<Vec<Recipient>>;
}
