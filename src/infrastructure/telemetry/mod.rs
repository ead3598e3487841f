pub mod analytics;
pub mod jetstream;

use async_trait::async_trait;

use crate::{application::services::telemetry::TelemetrySink, domain::events::DeliveryEvent};

pub use analytics::GoogleAnalyticsSink;
pub use jetstream::{JetstreamConfig, JetstreamSink};

/// Fallback for deployments without a telemetry backend configured.
pub struct NoopSink;

#[async_trait]
impl TelemetrySink for NoopSink {
    async fn emit(&self, _event: DeliveryEvent) -> anyhow::Result<()> {
        Ok(())
    }
}
