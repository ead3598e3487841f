use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    application::services::{telemetry::TelemetrySink, transport::DeliveryTransport},
    domain::{
        events::{DeliveryEvent, DeliveryOutcome},
        models::{BroadcastMessage, Recipient},
        repositories::{MessageStore, RecipientDirectory},
    },
};

/// Per-message fan-out outcome. Aggregated for logging, then discarded;
/// `attempted == succeeded + failed` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliverySummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

pub struct BroadcastDispatchHandler {
    store: Arc<dyn MessageStore>,
    directory: Arc<dyn RecipientDirectory>,
    transport: Arc<dyn DeliveryTransport>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl BroadcastDispatchHandler {
    pub fn new(
        store: Arc<dyn MessageStore>,
        directory: Arc<dyn RecipientDirectory>,
        transport: Arc<dyn DeliveryTransport>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        Self {
            store,
            directory,
            transport,
            telemetry,
        }
    }

    /// Deliver one message to every recipient in the current directory
    /// snapshot. The snapshot is taken once per message; a failing
    /// recipient is counted and skipped, and the remaining recipients are
    /// still attempted.
    pub async fn deliver(&self, message: &BroadcastMessage) -> DeliverySummary {
        let recipients = match self.directory.snapshot().await {
            Ok(recipients) => recipients,
            Err(err) => {
                error!(
                    message_id = message.id,
                    error = %err,
                    "failed to load recipient snapshot"
                );
                return DeliverySummary::default();
            }
        };

        let text = message.render();
        let mut summary = DeliverySummary::default();

        for recipient in &recipients {
            summary.attempted += 1;
            match self.transport.send(recipient, &text).await {
                Ok(()) => {
                    summary.succeeded += 1;
                    self.track(message, recipient, DeliveryOutcome::Delivered)
                        .await;
                }
                Err(err) => {
                    summary.failed += 1;
                    warn!(
                        message_id = message.id,
                        chat_id = recipient.chat_id,
                        error = %err,
                        "failed to deliver broadcast"
                    );
                    self.track(
                        message,
                        recipient,
                        DeliveryOutcome::Failed {
                            reason: err.to_string(),
                        },
                    )
                    .await;
                }
            }
        }

        info!(
            message_id = message.id,
            attempted = summary.attempted,
            delivered = summary.succeeded,
            failed = summary.failed,
            "broadcast fan-out finished"
        );

        summary
    }

    /// Mark a message terminal after a fan-out pass, whatever the
    /// per-recipient outcomes were. A store failure leaves the message
    /// due, so the next cycle will fan it out again.
    pub async fn complete(&self, message_id: i64) {
        if let Err(err) = self.store.mark_sent(message_id).await {
            error!(message_id, error = %err, "failed to mark message sent");
        }
    }

    /// Best-effort telemetry; sink errors are logged and dropped.
    async fn track(
        &self,
        message: &BroadcastMessage,
        recipient: &Recipient,
        outcome: DeliveryOutcome,
    ) {
        let event = DeliveryEvent {
            event_id: Uuid::new_v4(),
            message_id: message.id,
            message_title: message.title.clone(),
            chat_id: recipient.chat_id,
            username: recipient.username.clone(),
            language_code: recipient.language_code.clone(),
            outcome,
            occurred_at: Utc::now(),
        };
        if let Err(err) = self.telemetry.emit(event).await {
            debug!(chat_id = recipient.chat_id, error = %err, "telemetry emit failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::*;
    use crate::infrastructure::repositories::in_memory::{
        InMemoryMessageStore, InMemoryRecipientDirectory,
    };

    struct RecordingTransport {
        pub sent: Mutex<Vec<(i64, String)>>,
        pub failing_chats: HashSet<i64>,
    }

    impl RecordingTransport {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
                failing_chats: HashSet::new(),
            })
        }

        fn failing_for(chats: impl IntoIterator<Item = i64>) -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
                failing_chats: chats.into_iter().collect(),
            })
        }
    }

    #[async_trait]
    impl DeliveryTransport for RecordingTransport {
        async fn send(&self, recipient: &Recipient, text: &str) -> anyhow::Result<()> {
            if self.failing_chats.contains(&recipient.chat_id) {
                anyhow::bail!("chat {} unreachable", recipient.chat_id);
            }
            self.sent
                .lock()
                .await
                .push((recipient.chat_id, text.to_string()));
            Ok(())
        }
    }

    struct RecordingSink {
        pub events: Mutex<Vec<DeliveryEvent>>,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                events: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TelemetrySink for RecordingSink {
        async fn emit(&self, event: DeliveryEvent) -> anyhow::Result<()> {
            self.events.lock().await.push(event);
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl TelemetrySink for FailingSink {
        async fn emit(&self, _event: DeliveryEvent) -> anyhow::Result<()> {
            anyhow::bail!("sink offline")
        }
    }

    struct FailingDirectory;

    #[async_trait]
    impl RecipientDirectory for FailingDirectory {
        async fn snapshot(&self) -> anyhow::Result<Vec<Recipient>> {
            anyhow::bail!("directory unavailable")
        }
    }

    fn recipient(chat_id: i64) -> Recipient {
        Recipient {
            chat_id,
            username: Some(format!("user{chat_id}")),
            first_name: None,
            language_code: Some("en".to_string()),
            blocked: false,
        }
    }

    fn due_message(id: i64) -> BroadcastMessage {
        BroadcastMessage {
            id,
            title: Some("Weekly digest".to_string()),
            content: "fresh sets".to_string(),
            scheduled_at: Utc::now() - chrono::Duration::minutes(5),
            sent: false,
        }
    }

    async fn directory_of(chats: &[i64]) -> Arc<InMemoryRecipientDirectory> {
        let directory = Arc::new(InMemoryRecipientDirectory::new());
        for &chat_id in chats {
            directory.add(recipient(chat_id)).await;
        }
        directory
    }

    #[tokio::test]
    async fn one_failing_recipient_does_not_block_the_rest() {
        let store = Arc::new(InMemoryMessageStore::new());
        let transport = RecordingTransport::failing_for([2]);
        let handler = BroadcastDispatchHandler::new(
            store,
            directory_of(&[1, 2, 3]).await,
            transport.clone(),
            RecordingSink::new(),
        );

        let summary = handler.deliver(&due_message(10)).await;

        assert_eq!(
            summary,
            DeliverySummary {
                attempted: 3,
                succeeded: 2,
                failed: 1
            }
        );
        let sent = transport.sent.lock().await;
        let delivered_to: Vec<i64> = sent.iter().map(|(chat, _)| *chat).collect();
        assert_eq!(delivered_to, vec![1, 3]);
    }

    #[tokio::test]
    async fn summary_counts_always_balance() {
        let store = Arc::new(InMemoryMessageStore::new());
        let transport = RecordingTransport::failing_for([1, 3]);
        let handler = BroadcastDispatchHandler::new(
            store,
            directory_of(&[1, 2, 3, 4]).await,
            transport,
            RecordingSink::new(),
        );

        let summary = handler.deliver(&due_message(11)).await;
        assert_eq!(summary.attempted, summary.succeeded + summary.failed);
        assert_eq!(summary.attempted, 4);
    }

    #[tokio::test]
    async fn telemetry_failure_is_invisible_to_delivery() {
        let store = Arc::new(InMemoryMessageStore::new());
        let transport = RecordingTransport::new();
        let handler = BroadcastDispatchHandler::new(
            store,
            directory_of(&[1, 2]).await,
            transport.clone(),
            Arc::new(FailingSink),
        );

        let summary = handler.deliver(&due_message(12)).await;

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 0);
        assert_eq!(transport.sent.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn telemetry_carries_outcomes_for_both_paths() {
        let store = Arc::new(InMemoryMessageStore::new());
        let sink = RecordingSink::new();
        let handler = BroadcastDispatchHandler::new(
            store,
            directory_of(&[1, 2]).await,
            RecordingTransport::failing_for([2]),
            sink.clone(),
        );

        handler.deliver(&due_message(13)).await;

        let events = sink.events.lock().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].outcome, DeliveryOutcome::Delivered);
        assert_eq!(events[0].name(), "newsletter_delivered");
        assert!(matches!(events[1].outcome, DeliveryOutcome::Failed { .. }));
        assert_eq!(events[1].name(), "newsletter_failed");
        assert_eq!(events[1].message_id, 13);
        assert_eq!(events[1].chat_id, 2);
    }

    #[tokio::test]
    async fn snapshot_failure_yields_empty_summary() {
        let store = Arc::new(InMemoryMessageStore::new());
        let handler = BroadcastDispatchHandler::new(
            store,
            Arc::new(FailingDirectory),
            RecordingTransport::new(),
            RecordingSink::new(),
        );

        let summary = handler.deliver(&due_message(14)).await;
        assert_eq!(summary, DeliverySummary::default());
    }

    #[tokio::test]
    async fn complete_marks_sent_and_is_idempotent() {
        let store = Arc::new(InMemoryMessageStore::new());
        store.insert(due_message(15)).await;
        let handler = BroadcastDispatchHandler::new(
            store.clone(),
            directory_of(&[1]).await,
            RecordingTransport::new(),
            RecordingSink::new(),
        );

        handler.complete(15).await;
        assert!(store.get(15).await.unwrap().sent);

        handler.complete(15).await;
        assert!(store.get(15).await.unwrap().sent);
    }
}
