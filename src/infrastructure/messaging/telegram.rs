use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    application::services::transport::DeliveryTransport,
    domain::{errors::DomainError, models::Recipient},
};

pub struct TelegramClient {
    http: Client,
    base_url: String,
    bot_token: String,
}

impl TelegramClient {
    pub fn new(bot_token: String) -> Arc<dyn DeliveryTransport> {
        Arc::new(Self {
            http: Client::builder()
                .user_agent("newsletter-service/telegram")
                .build()
                .expect("failed to build telegram client"),
            base_url: "https://api.telegram.org".to_string(),
            bot_token,
        }) as Arc<dyn DeliveryTransport>
    }

    fn build_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.bot_token, method)
    }
}

#[async_trait]
impl DeliveryTransport for TelegramClient {
    async fn send(&self, recipient: &Recipient, text: &str) -> anyhow::Result<()> {
        let response = self
            .http
            .post(self.build_url("sendMessage"))
            .json(&serde_json::json!({
                "chat_id": recipient.chat_id,
                "text": text,
                "parse_mode": "HTML",
            }))
            .send()
            .await?;

        let payload: TelegramSendResponse = response.json().await?;
        if !payload.ok {
            return Err(DomainError::DeliveryFailed {
                chat_id: recipient.chat_id,
                reason: payload
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            }
            .into());
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TelegramSendResponse {
    ok: bool,
    description: Option<String>,
}
