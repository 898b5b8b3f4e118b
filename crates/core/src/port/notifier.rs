// Notifier Port
//
// Email transport is an external collaborator; the engine only consumes
// the "send notification for event X" contract.

use crate::domain::NotificationEvent;
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification. Best-effort: errors are logged and the
    /// outbox row retried, never surfaced to the transition's caller.
    async fn notify(&self, event: &NotificationEvent) -> Result<()>;
}

/// Structured-log notifier (production default; real mail is out of scope)
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: &NotificationEvent) -> Result<()> {
        let job = event.job();
        tracing::info!(
            event = event.label(),
            job_id = job.id,
            recipient = %job.student_email,
            status = %job.status,
            "notification dispatched"
        );
        Ok(())
    }
}
