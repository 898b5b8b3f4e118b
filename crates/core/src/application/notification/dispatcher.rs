// Outbox Dispatcher
//
// Background task: polls the notification outbox and hands events to
// the Notifier. A delivery failure increments the row's attempt counter
// and is retried on the next poll until the row parks at max_attempts.
// Nothing here ever propagates back into a lifecycle transition.

use crate::error::Result;
use crate::port::{NotificationOutbox, Notifier};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, warn};

use super::shutdown::ShutdownToken;

const BATCH_SIZE: u32 = 32;

pub struct OutboxDispatcher {
    outbox: Arc<dyn NotificationOutbox>,
    notifier: Arc<dyn Notifier>,
    poll_interval: Duration,
    max_attempts: i32,
}

impl OutboxDispatcher {
    pub fn new(outbox: Arc<dyn NotificationOutbox>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            outbox,
            notifier,
            poll_interval: Duration::from_secs(2),
            max_attempts: 5,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Dispatch loop (spawn with tokio::spawn).
    pub async fn run(self, mut shutdown: ShutdownToken) {
        info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            max_attempts = self.max_attempts,
            "outbox dispatcher started"
        );

        let mut tick = interval(self.poll_interval);

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    if let Err(e) = self.run_once().await {
                        error!(error = %e, "outbox poll failed");
                    }
                }
                _ = shutdown.wait() => {
                    // Final drain so nothing queued during shutdown is lost
                    if let Err(e) = self.run_once().await {
                        error!(error = %e, "final outbox drain failed");
                    }
                    info!("outbox dispatcher stopped");
                    return;
                }
            }
        }
    }

    /// Drain one batch of pending rows; returns how many were dispatched.
    pub async fn run_once(&self) -> Result<usize> {
        let pending = self
            .outbox
            .fetch_pending(BATCH_SIZE, self.max_attempts)
            .await?;

        let mut dispatched = 0;
        for entry in pending {
            match self.notifier.notify(&entry.event).await {
                Ok(()) => {
                    self.outbox.mark_dispatched(entry.id).await?;
                    dispatched += 1;
                }
                Err(e) => {
                    warn!(
                        outbox_id = entry.id,
                        event = entry.event.label(),
                        attempts = entry.attempts + 1,
                        error = %e,
                        "notification delivery failed"
                    );
                    self.outbox.mark_failed(entry.id).await?;
                }
            }
        }

        Ok(dispatched)
    }
}
