// SQLite JobRepository Implementation

use async_trait::async_trait;
use printlab_core::domain::{AuditAction, AuditEntry, Job, JobId, JobStatus, NewJob};
use printlab_core::error::{AppError, Result};
use printlab_core::port::{JobRepository, TimeProvider};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;

// Helper to convert sqlx::Error to AppError with structured information
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                let code_str = code.as_ref();

                // SQLite error codes: https://www.sqlite.org/rescode.html
                match code_str {
                    "2067" | "1555" => {
                        // UNIQUE constraint failed (confirmation_token or rowid)
                        AppError::Conflict(format!(
                            "Unique constraint violation: {} ({})",
                            db_err.message(),
                            code_str
                        ))
                    }
                    "787" | "3850" => AppError::Database(format!(
                        "Foreign key constraint violation: {} ({})",
                        db_err.message(),
                        code_str
                    )),
                    "5" => AppError::Database(format!(
                        "Database locked (SQLITE_BUSY): {}",
                        db_err.message()
                    )),
                    "13" => AppError::Database(format!("Database full: {}", db_err.message())),
                    _ => AppError::Database(format!(
                        "Database error [{}]: {}",
                        code_str,
                        db_err.message()
                    )),
                }
            } else {
                AppError::Database(format!("Database error: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => AppError::Database("Row not found".to_string()),
        sqlx::Error::ColumnNotFound(col) => AppError::Database(format!("Column not found: {}", col)),
        _ => AppError::Database(err.to_string()),
    }
}

pub struct SqliteJobRepository {
    pool: SqlitePool,
    clock: Arc<dyn TimeProvider>,
}

impl SqliteJobRepository {
    pub fn new(pool: SqlitePool, clock: Arc<dyn TimeProvider>) -> Self {
        Self { pool, clock }
    }

    /// Append an audit entry inside an open transaction.
    async fn append_audit(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        job_id: JobId,
        action: AuditAction,
        old_status: Option<JobStatus>,
        new_status: Option<JobStatus>,
        details: Option<&str>,
        now: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_log (job_id, action, old_status, new_status, details, timestamp)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(job_id)
        .bind(action.to_string())
        .bind(old_status.map(|s| s.to_string()))
        .bind(new_status.map(|s| s.to_string()))
        .bind(details)
        .bind(now)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    /// Distinguish "job missing" from "status moved underneath" after a
    /// conditional update touched zero rows.
    async fn zero_rows_error(&self, id: JobId, expected: JobStatus, to: JobStatus) -> AppError {
        let current: std::result::Result<Option<String>, sqlx::Error> =
            sqlx::query_scalar("SELECT status FROM jobs WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await;

        match current {
            Ok(None) => AppError::NotFound(format!("Job {} not found", id)),
            Ok(Some(current)) => AppError::InvalidState(format!(
                "Cannot update job {} to {}: expected status {}, found {}",
                id, to, expected, current
            )),
            Err(e) => map_sqlx_error(e),
        }
    }
}

#[async_trait]
impl JobRepository for SqliteJobRepository {
    async fn insert(&self, job: &NewJob) -> Result<JobId> {
        let now = self.clock.now_millis();
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let result = sqlx::query(
            r#"
            INSERT INTO jobs (
                student_name, student_email, discipline, class_project,
                print_method, color, original_filename, file_size,
                status, confirmation_token, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&job.student_name)
        .bind(&job.student_email)
        .bind(&job.discipline)
        .bind(&job.class_project)
        .bind(job.print_method.to_string())
        .bind(&job.color)
        .bind(&job.original_filename)
        .bind(job.file_size)
        .bind(JobStatus::Uploaded.to_string())
        .bind(&job.confirmation_token)
        .bind(job.created_at)
        .bind(job.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let id = result.last_insert_rowid();

        Self::append_audit(
            &mut tx,
            id,
            AuditAction::Created,
            None,
            Some(JobStatus::Uploaded),
            None,
            now,
        )
        .await?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(id)
    }

    async fn find_by_id(&self, id: JobId) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(JobRow::into_job).transpose()
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE confirmation_token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(JobRow::into_job).transpose()
    }

    async fn list_by_status(&self, status: Option<JobStatus>) -> Result<Vec<Job>> {
        let rows: Vec<JobRow> = match status {
            Some(status) => {
                sqlx::query_as(
                    "SELECT * FROM jobs WHERE status = ? ORDER BY created_at DESC, id DESC",
                )
                .bind(status.to_string())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as("SELECT * FROM jobs ORDER BY created_at DESC, id DESC")
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(JobRow::into_job).collect()
    }

    async fn mark_received(&self, id: JobId, stored_filename: &str) -> Result<()> {
        let now = self.clock.now_millis();
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET stored_filename = ?, status = ?, updated_at = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(stored_filename)
        .bind(JobStatus::Pending.to_string())
        .bind(now)
        .bind(id)
        .bind(JobStatus::Uploaded.to_string())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(self
                .zero_rows_error(id, JobStatus::Uploaded, JobStatus::Pending)
                .await);
        }

        Self::append_audit(
            &mut tx,
            id,
            AuditAction::StatusChanged,
            Some(JobStatus::Uploaded),
            Some(JobStatus::Pending),
            None,
            now,
        )
        .await?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn update_status(
        &self,
        id: JobId,
        from: JobStatus,
        to: JobStatus,
        details: Option<&str>,
    ) -> Result<()> {
        let now = self.clock.now_millis();
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = ?, updated_at = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(to.to_string())
        .bind(now)
        .bind(id)
        .bind(from.to_string())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(self.zero_rows_error(id, from, to).await);
        }

        Self::append_audit(
            &mut tx,
            id,
            AuditAction::StatusChanged,
            Some(from),
            Some(to),
            details,
            now,
        )
        .await?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn approve(
        &self,
        id: JobId,
        weight_grams: f64,
        time_hours: f64,
        cost: f64,
    ) -> Result<()> {
        let now = self.clock.now_millis();
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = ?, weight_grams = ?, time_hours = ?, cost = ?, updated_at = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(JobStatus::Approved.to_string())
        .bind(weight_grams)
        .bind(time_hours)
        .bind(cost)
        .bind(now)
        .bind(id)
        .bind(JobStatus::Pending.to_string())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(self
                .zero_rows_error(id, JobStatus::Pending, JobStatus::Approved)
                .await);
        }

        let details = format!(
            "Cost: {}, Weight: {}g, Time: {}h",
            cost, weight_grams, time_hours
        );
        Self::append_audit(
            &mut tx,
            id,
            AuditAction::Approved,
            Some(JobStatus::Pending),
            Some(JobStatus::Approved),
            Some(&details),
            now,
        )
        .await?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn reject(&self, id: JobId, reason: &str) -> Result<()> {
        let now = self.clock.now_millis();
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = ?, rejection_reason = ?, updated_at = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(JobStatus::Rejected.to_string())
        .bind(reason)
        .bind(now)
        .bind(id)
        .bind(JobStatus::Pending.to_string())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(self
                .zero_rows_error(id, JobStatus::Pending, JobStatus::Rejected)
                .await);
        }

        Self::append_audit(
            &mut tx,
            id,
            AuditAction::Rejected,
            Some(JobStatus::Pending),
            Some(JobStatus::Rejected),
            Some(reason),
            now,
        )
        .await?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn audit_log(&self, id: JobId) -> Result<Vec<AuditEntry>> {
        let rows: Vec<AuditRow> = sqlx::query_as(
            r#"
            SELECT * FROM audit_log
            WHERE job_id = ?
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(AuditRow::into_entry).collect()
    }
}

/// SQLite row representation of a job
#[derive(Debug, sqlx::FromRow)]
struct JobRow {
    id: i64,
    student_name: String,
    student_email: String,
    discipline: String,
    class_project: Option<String>,
    print_method: String,
    color: String,
    stored_filename: Option<String>,
    original_filename: String,
    file_size: i64,
    status: String,
    weight_grams: Option<f64>,
    time_hours: Option<f64>,
    cost: Option<f64>,
    confirmation_token: String,
    rejection_reason: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl JobRow {
    fn into_job(self) -> Result<Job> {
        use printlab_core::domain::PrintMethod;

        let status = JobStatus::from_str(&self.status)
            .map_err(|e| AppError::Database(e.to_string()))?;
        let print_method = PrintMethod::from_str(&self.print_method)
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(Job {
            id: self.id,
            student_name: self.student_name,
            student_email: self.student_email,
            discipline: self.discipline,
            class_project: self.class_project,
            print_method,
            color: self.color,
            stored_filename: self.stored_filename,
            original_filename: self.original_filename,
            file_size: self.file_size,
            status,
            weight_grams: self.weight_grams,
            time_hours: self.time_hours,
            cost: self.cost,
            confirmation_token: self.confirmation_token,
            rejection_reason: self.rejection_reason,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SQLite row representation of an audit entry
#[derive(Debug, sqlx::FromRow)]
struct AuditRow {
    id: i64,
    job_id: i64,
    action: String,
    old_status: Option<String>,
    new_status: Option<String>,
    details: Option<String>,
    timestamp: i64,
}

impl AuditRow {
    fn into_entry(self) -> Result<AuditEntry> {
        let action = AuditAction::from_str(&self.action)
            .map_err(|e| AppError::Database(e.to_string()))?;
        let old_status = self
            .old_status
            .as_deref()
            .map(JobStatus::from_str)
            .transpose()
            .map_err(|e| AppError::Database(e.to_string()))?;
        let new_status = self
            .new_status
            .as_deref()
            .map(JobStatus::from_str)
            .transpose()
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(AuditEntry {
            id: self.id,
            job_id: self.job_id,
            action,
            old_status,
            new_status,
            details: self.details,
            timestamp: self.timestamp,
        })
    }
}
