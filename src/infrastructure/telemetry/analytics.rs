use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;

use crate::{
    application::services::telemetry::TelemetrySink,
    domain::events::{DeliveryEvent, DeliveryOutcome},
};

/// Google Analytics Measurement Protocol sink. Each delivery attempt
/// becomes one event keyed by a synthetic per-chat client id.
pub struct GoogleAnalyticsSink {
    http: Client,
    base_url: String,
    measurement_id: String,
    api_secret: String,
}

impl GoogleAnalyticsSink {
    pub fn new(measurement_id: String, api_secret: String) -> Arc<dyn TelemetrySink> {
        Arc::new(Self {
            http: Client::builder()
                .user_agent("newsletter-service/analytics")
                .build()
                .expect("failed to build analytics client"),
            base_url: "https://www.google-analytics.com".to_string(),
            measurement_id,
            api_secret,
        }) as Arc<dyn TelemetrySink>
    }
}

#[async_trait]
impl TelemetrySink for GoogleAnalyticsSink {
    async fn emit(&self, event: DeliveryEvent) -> anyhow::Result<()> {
        let url = format!(
            "{}/mp/collect?measurement_id={}&api_secret={}",
            self.base_url, self.measurement_id, self.api_secret
        );

        let mut params = serde_json::Map::new();
        params.insert("message_id".to_string(), json!(event.message_id));
        params.insert("sent_at".to_string(), json!(event.occurred_at.to_rfc3339()));
        if let Some(title) = &event.message_title {
            params.insert("message_title".to_string(), json!(title));
        }
        if let DeliveryOutcome::Failed { reason } = &event.outcome {
            params.insert("reason".to_string(), json!(reason));
        }

        let mut user_properties = serde_json::Map::new();
        if let Some(username) = &event.username {
            user_properties.insert("username".to_string(), json!({ "value": username }));
        }
        if let Some(language) = &event.language_code {
            user_properties.insert("language".to_string(), json!({ "value": language }));
        }

        let payload = json!({
            "client_id": format!("tg-{}", event.chat_id),
            "user_properties": user_properties,
            "events": [{
                "name": event.name(),
                "params": params,
            }],
        });

        let response = self.http.post(url).json(&payload).send().await?;
        if response.status() != StatusCode::NO_CONTENT {
            anyhow::bail!("analytics responded with status {}", response.status());
        }

        Ok(())
    }
}
