// Job Repository Port (Interface)
//
// All mutating operations are atomic single-record updates; a status
// mutation and its audit entry share one storage transaction.

use crate::domain::{AuditEntry, Job, JobId, JobStatus, NewJob};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for Job persistence + append-only audit log
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Insert a new job as `uploaded` and append the "created" audit entry.
    ///
    /// A confirmation-token collision surfaces as `AppError::Conflict`
    /// so the caller can regenerate and retry.
    async fn insert(&self, job: &NewJob) -> Result<JobId>;

    /// Find job by ID
    async fn find_by_id(&self, id: JobId) -> Result<Option<Job>>;

    /// Find job by confirmation token
    async fn find_by_token(&self, token: &str) -> Result<Option<Job>>;

    /// Jobs with the given status (or all), newest-created first
    async fn list_by_status(&self, status: Option<JobStatus>) -> Result<Vec<Job>>;

    /// Record the verified upload: set the stored filename and move
    /// `uploaded -> pending`, appending a "status_changed" audit entry.
    async fn mark_received(&self, id: JobId, stored_filename: &str) -> Result<()>;

    /// Conditional status update (`WHERE status = from`) plus a
    /// "status_changed" audit entry. Fails with NotFound when the job
    /// does not exist and InvalidState when the status moved underneath.
    async fn update_status(
        &self,
        id: JobId,
        from: JobStatus,
        to: JobStatus,
        details: Option<&str>,
    ) -> Result<()>;

    /// Approve a pending job: set weight/time/cost atomically, move to
    /// `approved` and append the "approved" audit entry.
    async fn approve(&self, id: JobId, weight_grams: f64, time_hours: f64, cost: f64)
        -> Result<()>;

    /// Reject a pending job: store the reason, move to `rejected` and
    /// append the "rejected" audit entry.
    async fn reject(&self, id: JobId, reason: &str) -> Result<()>;

    /// Audit entries for a job, newest first
    async fn audit_log(&self, id: JobId) -> Result<Vec<AuditEntry>>;
}
