use async_trait::async_trait;

use crate::domain::events::DeliveryEvent;

/// Best-effort event emission. Callers discard the result; a sink failure
/// must never surface as a delivery failure.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn emit(&self, event: DeliveryEvent) -> anyhow::Result<()>;
}
