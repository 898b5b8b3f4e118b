// SQLite Notification Outbox Implementation

use async_trait::async_trait;
use printlab_core::domain::NotificationEvent;
use printlab_core::error::Result;
use printlab_core::port::{NotificationOutbox, OutboxEntry, TimeProvider};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::warn;

use crate::job_repository::map_sqlx_error;

pub struct SqliteNotificationOutbox {
    pool: SqlitePool,
    clock: Arc<dyn TimeProvider>,
}

impl SqliteNotificationOutbox {
    pub fn new(pool: SqlitePool, clock: Arc<dyn TimeProvider>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl NotificationOutbox for SqliteNotificationOutbox {
    async fn enqueue(&self, event: &NotificationEvent) -> Result<i64> {
        let payload = serde_json::to_string(event)?;
        let now = self.clock.now_millis();

        let result = sqlx::query(
            "INSERT INTO notification_outbox (event, attempts, created_at) VALUES (?, 0, ?)",
        )
        .bind(payload)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.last_insert_rowid())
    }

    async fn fetch_pending(&self, limit: u32, max_attempts: i32) -> Result<Vec<OutboxEntry>> {
        let rows: Vec<OutboxRow> = sqlx::query_as(
            r#"
            SELECT id, event, attempts, created_at FROM notification_outbox
            WHERE dispatched_at IS NULL AND attempts < ?
            ORDER BY id ASC
            LIMIT ?
            "#,
        )
        .bind(max_attempts)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::from_str::<NotificationEvent>(&row.event) {
                Ok(event) => entries.push(OutboxEntry {
                    id: row.id,
                    event,
                    attempts: row.attempts,
                    created_at: row.created_at,
                }),
                Err(e) => {
                    // Undecodable row: count it as a failed attempt so it
                    // parks instead of wedging the dispatcher.
                    warn!(outbox_id = row.id, error = %e, "undecodable outbox event");
                    self.mark_failed(row.id).await?;
                }
            }
        }

        Ok(entries)
    }

    async fn mark_dispatched(&self, id: i64) -> Result<()> {
        let now = self.clock.now_millis();
        sqlx::query("UPDATE notification_outbox SET dispatched_at = ? WHERE id = ?")
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn mark_failed(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE notification_outbox SET attempts = attempts + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OutboxRow {
    id: i64,
    event: String,
    attempts: i32,
    created_at: i64,
}
