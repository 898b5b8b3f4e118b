// Token-based Confirmation Use Case
//
// Resolution is idempotent: an unknown token reports "invalid
// confirmation link" and a token whose job already left `approved`
// reports "already processed". Neither path mutates state.

use crate::domain::{Job, JobId, JobStatus};
use crate::error::{AppError, Result};
use crate::port::JobRepository;
use serde::{Deserialize, Serialize};
use tracing::info;

/// What the submitter clicked on the confirmation page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmAction {
    Confirm,
    Cancel,
}

impl ConfirmAction {
    fn target_status(self) -> JobStatus {
        match self {
            ConfirmAction::Confirm => JobStatus::Confirmed,
            ConfirmAction::Cancel => JobStatus::Cancelled,
        }
    }
}

impl std::fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfirmAction::Confirm => write!(f, "confirm"),
            ConfirmAction::Cancel => write!(f, "cancel"),
        }
    }
}

/// Resolve a mailed confirmation link.
pub async fn resolve(
    repo: &dyn JobRepository,
    token: &str,
    action: ConfirmAction,
) -> Result<JobId> {
    let job = repo
        .find_by_token(token)
        .await?
        .ok_or_else(|| AppError::NotFound("invalid confirmation link".to_string()))?;

    if job.status != JobStatus::Approved {
        return Err(AppError::InvalidState(format!(
            "Job {} has already been processed (status: {})",
            job.id, job.status
        )));
    }

    repo.update_status(job.id, JobStatus::Approved, action.target_status(), None)
        .await?;

    info!(job_id = job.id, action = %action, "confirmation resolved");
    Ok(job.id)
}

/// Load the job behind a token for rendering the confirmation page.
pub async fn lookup(repo: &dyn JobRepository, token: &str) -> Result<Option<Job>> {
    repo.find_by_token(token).await
}
