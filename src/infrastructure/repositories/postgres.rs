use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Postgres};

use crate::domain::{
    models::{BroadcastMessage, Recipient},
    repositories::{MessageStore, RecipientDirectory},
};

pub type PgPool = Pool<Postgres>;

#[derive(Clone)]
pub struct PostgresMessageStore {
    pool: PgPool,
}

impl PostgresMessageStore {
    pub fn new(pool: PgPool) -> Arc<Self> {
        Arc::new(Self { pool })
    }
}

#[async_trait]
impl MessageStore for PostgresMessageStore {
    async fn fetch_due(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<BroadcastMessage>> {
        let rows = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT id, title, content, scheduled_at, sent
            FROM messages
            WHERE sent = FALSE
              AND scheduled_at <= $1
            ORDER BY scheduled_at ASC
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(BroadcastMessage::from).collect())
    }

    async fn mark_sent(&self, message_id: i64) -> anyhow::Result<()> {
        // single-row atomic update; re-marking an already-sent row is a no-op
        sqlx::query("UPDATE messages SET sent = TRUE WHERE id = $1")
            .bind(message_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PostgresRecipientDirectory {
    pool: PgPool,
}

impl PostgresRecipientDirectory {
    pub fn new(pool: PgPool) -> Arc<Self> {
        Arc::new(Self { pool })
    }
}

#[async_trait]
impl RecipientDirectory for PostgresRecipientDirectory {
    async fn snapshot(&self) -> anyhow::Result<Vec<Recipient>> {
        let rows = sqlx::query_as::<_, RecipientRecord>(
            r#"
            SELECT chat_id, username, first_name, language_code, blocked
            FROM users
            WHERE blocked = FALSE
            ORDER BY started_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Recipient::from).collect())
    }
}

#[derive(FromRow)]
struct MessageRecord {
    id: i64,
    title: Option<String>,
    content: String,
    scheduled_at: DateTime<Utc>,
    sent: bool,
}

impl From<MessageRecord> for BroadcastMessage {
    fn from(value: MessageRecord) -> Self {
        Self {
            id: value.id,
            title: value.title,
            content: value.content,
            scheduled_at: value.scheduled_at,
            sent: value.sent,
        }
    }
}

#[derive(FromRow)]
struct RecipientRecord {
    chat_id: i64,
    username: Option<String>,
    first_name: Option<String>,
    language_code: Option<String>,
    blocked: bool,
}

impl From<RecipientRecord> for Recipient {
    fn from(value: RecipientRecord) -> Self {
        Self {
            chat_id: value.chat_id,
            username: value.username,
            first_name: value.first_name,
            language_code: value.language_code,
            blocked: value.blocked,
        }
    }
}
