use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Delivery to chat {chat_id} failed: {reason}")]
    DeliveryFailed { chat_id: i64, reason: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
