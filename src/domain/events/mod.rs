use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Delivered,
    Failed { reason: String },
}

/// One delivery attempt, shaped for the telemetry sink. Lives only for
/// the duration of a fan-out pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryEvent {
    pub event_id: Uuid,
    pub message_id: i64,
    pub message_title: Option<String>,
    pub chat_id: i64,
    pub username: Option<String>,
    pub language_code: Option<String>,
    pub outcome: DeliveryOutcome,
    pub occurred_at: DateTime<Utc>,
}

impl DeliveryEvent {
    pub fn name(&self) -> &'static str {
        match self.outcome {
            DeliveryOutcome::Delivered => "newsletter_delivered",
            DeliveryOutcome::Failed { .. } => "newsletter_failed",
        }
    }
}
