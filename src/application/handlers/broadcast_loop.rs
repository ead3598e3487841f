use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, error, info};

use crate::{
    application::handlers::broadcast_dispatcher::BroadcastDispatchHandler,
    domain::repositories::MessageStore,
};

/// Drives the periodic poll for due broadcasts and owns the loop's
/// liveness: nothing inside a cycle is allowed to end it.
pub struct BroadcastScheduler {
    store: Arc<dyn MessageStore>,
    dispatcher: Arc<BroadcastDispatchHandler>,
    poll_interval: Duration,
}

impl BroadcastScheduler {
    pub fn new(
        store: Arc<dyn MessageStore>,
        dispatcher: Arc<BroadcastDispatchHandler>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            store,
            dispatcher,
            poll_interval,
        }
    }

    /// Poll indefinitely. The sleep is a fixed interval and does not
    /// account for time spent delivering, so the cadence drifts by the
    /// length of each fan-out burst; the measured cycle duration is
    /// logged to keep that drift observable.
    pub async fn run(&self) {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            "broadcast scheduler started"
        );

        loop {
            let started = Instant::now();
            self.run_cycle().await;
            debug!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "poll cycle finished"
            );
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// One poll pass: fetch the due messages and fan each out in
    /// scheduled order, marking each terminal afterwards. A store read
    /// failure skips the pass; the messages stay due for the next one.
    pub async fn run_cycle(&self) {
        let now = Utc::now();
        let due = match self.store.fetch_due(now).await {
            Ok(due) => due,
            Err(err) => {
                error!(error = %err, "failed to fetch due broadcasts");
                return;
            }
        };

        if due.is_empty() {
            debug!("no pending broadcasts");
            return;
        }

        info!(count = due.len(), "picked up due broadcasts");

        for message in &due {
            self.dispatcher.deliver(message).await;
            self.dispatcher.complete(message.id).await;
        }
    }
}
