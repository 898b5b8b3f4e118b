// Notification Outbox Port
//
// Events are appended after the triggering persistence write commits;
// the dispatcher drains pending rows. Dispatch failure never rolls the
// transition back.

use crate::domain::NotificationEvent;
use crate::error::Result;
use async_trait::async_trait;

/// A pending (or parked) outbox row
#[derive(Debug, Clone)]
pub struct OutboxEntry {
    pub id: i64,
    pub event: NotificationEvent,
    pub attempts: i32,
    pub created_at: i64,
}

#[async_trait]
pub trait NotificationOutbox: Send + Sync {
    /// Append an event for later dispatch.
    async fn enqueue(&self, event: &NotificationEvent) -> Result<i64>;

    /// Undispatched rows with fewer than `max_attempts` failures, oldest first.
    async fn fetch_pending(&self, limit: u32, max_attempts: i32) -> Result<Vec<OutboxEntry>>;

    /// Mark a row as successfully dispatched.
    async fn mark_dispatched(&self, id: i64) -> Result<()>;

    /// Record a failed dispatch attempt (row is retried until parked).
    async fn mark_failed(&self, id: i64) -> Result<()>;
}
