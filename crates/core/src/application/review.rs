// Staff Review Use Cases - approve, reject, manual status update
//
// Side-effect ordering is persistence write first, outbox append
// second; a failed append is logged and never rolls the transition back.

use crate::config::LabConfig;
use crate::domain::{calculate_cost, transition, JobId, JobStatus, NotificationEvent};
use crate::error::{AppError, Result};
use crate::port::{JobRepository, NotificationOutbox};
use crate::application::session::Session;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ApproveRequest {
    pub job_id: JobId,
    pub weight_grams: f64,
    pub time_hours: f64,
}

/// Approve a pending job: price it, persist weight/time/cost atomically
/// and queue the approval notice with its confirmation link.
pub async fn approve(
    repo: &dyn JobRepository,
    outbox: &dyn NotificationOutbox,
    config: &LabConfig,
    session: &Session,
    req: ApproveRequest,
) -> Result<f64> {
    let staff = session.require_staff()?.to_string();

    if req.weight_grams < 0.0 || req.time_hours < 0.0 {
        return Err(AppError::Validation(
            "weight and time estimates must be non-negative".to_string(),
        ));
    }

    let job = repo
        .find_by_id(req.job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", req.job_id)))?;

    transition::ensure_allowed(job.status, JobStatus::Approved)?;

    let cost = calculate_cost(
        &config.pricing,
        job.print_method,
        req.weight_grams,
        req.time_hours,
    );

    repo.approve(job.id, req.weight_grams, req.time_hours, cost)
        .await?;

    let job = repo
        .find_by_id(req.job_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("job {} missing after approval", req.job_id)))?;

    let confirmation_url = format!(
        "{}/confirm?token={}",
        config.public_url.trim_end_matches('/'),
        job.confirmation_token
    );

    if let Err(e) = outbox
        .enqueue(&NotificationEvent::JobApproved {
            job,
            confirmation_url,
        })
        .await
    {
        warn!(job_id = req.job_id, error = %e, "failed to queue approval notification");
    }

    info!(job_id = req.job_id, staff = %staff, cost, "job approved");
    Ok(cost)
}

/// Reject a pending job with a free-text reason for the submitter.
pub async fn reject(
    repo: &dyn JobRepository,
    outbox: &dyn NotificationOutbox,
    session: &Session,
    job_id: JobId,
    reason: &str,
) -> Result<()> {
    let staff = session.require_staff()?.to_string();

    if reason.trim().is_empty() {
        return Err(AppError::Validation(
            "a rejection reason is required".to_string(),
        ));
    }

    let job = repo
        .find_by_id(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", job_id)))?;

    transition::ensure_allowed(job.status, JobStatus::Rejected)?;

    repo.reject(job.id, reason).await?;

    let job = repo
        .find_by_id(job_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("job {} missing after rejection", job_id)))?;

    if let Err(e) = outbox.enqueue(&NotificationEvent::JobRejected { job }).await {
        warn!(job_id, error = %e, "failed to queue rejection notification");
    }

    info!(job_id, staff = %staff, "job rejected");
    Ok(())
}

/// Manual stage update from the dashboard (queued/printing/completed/picked_up).
pub async fn update_status(
    repo: &dyn JobRepository,
    outbox: &dyn NotificationOutbox,
    session: &Session,
    job_id: JobId,
    new_status: JobStatus,
) -> Result<()> {
    let staff = session.require_staff()?.to_string();

    if !transition::STAFF_STAGES.contains(&new_status) {
        return Err(AppError::Validation(format!(
            "status '{}' cannot be set manually",
            new_status
        )));
    }

    let job = repo
        .find_by_id(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", job_id)))?;

    transition::ensure_allowed(job.status, new_status)?;

    repo.update_status(job_id, job.status, new_status, None)
        .await?;

    if new_status == JobStatus::Completed {
        let job = repo
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("job {} missing after update", job_id)))?;

        if let Err(e) = outbox
            .enqueue(&NotificationEvent::JobCompleted { job })
            .await
        {
            warn!(job_id, error = %e, "failed to queue completion notification");
        }
    }

    info!(job_id, staff = %staff, new_status = %new_status, "status updated");
    Ok(())
}
