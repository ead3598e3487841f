use async_trait::async_trait;

use crate::domain::models::Recipient;

/// A channel that can deliver rendered broadcast content to a single
/// recipient. Failures are per-recipient; the transport carries no retry
/// semantics of its own.
#[async_trait]
pub trait DeliveryTransport: Send + Sync {
    async fn send(&self, recipient: &Recipient, text: &str) -> anyhow::Result<()>;
}
