use std::sync::Arc;

use async_nats::jetstream;

use crate::{application::services::telemetry::TelemetrySink, domain::events::DeliveryEvent};

#[derive(Clone)]
pub struct JetstreamConfig {
    pub url: String,
    pub stream: String,
    pub subject: String,
}

/// Publishes delivery events to a JetStream subject for downstream
/// consumers. The stream is created on startup if it does not exist.
pub struct JetstreamSink {
    context: jetstream::Context,
    subject: String,
}

impl JetstreamSink {
    pub async fn new(config: &JetstreamConfig) -> anyhow::Result<Arc<Self>> {
        let client = async_nats::connect(&config.url).await?;
        let context = jetstream::new(client);

        context
            .get_or_create_stream(jetstream::stream::Config {
                name: config.stream.clone(),
                subjects: vec![config.subject.clone()],
                ..Default::default()
            })
            .await?;

        Ok(Arc::new(Self {
            context,
            subject: config.subject.clone(),
        }))
    }
}

#[async_trait::async_trait]
impl TelemetrySink for JetstreamSink {
    async fn emit(&self, event: DeliveryEvent) -> anyhow::Result<()> {
        let payload = serde_json::to_vec(&event)?;
        self.context
            .publish(self.subject.clone(), payload.into())
            .await?;
        Ok(())
    }
}
