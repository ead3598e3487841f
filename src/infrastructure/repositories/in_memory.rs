use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::{
    models::{BroadcastMessage, Recipient},
    repositories::{MessageStore, RecipientDirectory},
};

#[derive(Default)]
pub struct InMemoryMessageStore {
    messages: Arc<RwLock<HashMap<i64, BroadcastMessage>>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, message: BroadcastMessage) {
        let mut messages = self.messages.write().await;
        messages.insert(message.id, message);
    }

    pub async fn get(&self, message_id: i64) -> Option<BroadcastMessage> {
        let messages = self.messages.read().await;
        messages.get(&message_id).cloned()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn fetch_due(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<BroadcastMessage>> {
        let messages = self.messages.read().await;
        let mut due: Vec<BroadcastMessage> = messages
            .values()
            .filter(|message| message.is_due(now))
            .cloned()
            .collect();
        due.sort_by_key(|message| message.scheduled_at);
        Ok(due)
    }

    async fn mark_sent(&self, message_id: i64) -> anyhow::Result<()> {
        let mut messages = self.messages.write().await;
        if let Some(message) = messages.get_mut(&message_id) {
            message.sent = true;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryRecipientDirectory {
    recipients: Arc<RwLock<Vec<Recipient>>>,
}

impl InMemoryRecipientDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, recipient: Recipient) {
        self.recipients.write().await.push(recipient);
    }
}

#[async_trait]
impl RecipientDirectory for InMemoryRecipientDirectory {
    async fn snapshot(&self) -> anyhow::Result<Vec<Recipient>> {
        let recipients = self.recipients.read().await;
        Ok(recipients
            .iter()
            .filter(|recipient| !recipient.blocked)
            .cloned()
            .collect())
    }
}
