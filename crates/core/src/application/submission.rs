// Submission Use Case
//
// Validate -> create job (uploaded) -> store file -> mark received
// (pending) -> emit JobSubmitted. A file-store failure aborts before
// the job reaches `pending`.

use crate::config::LabConfig;
use crate::domain::job::stored_filename_for;
use crate::domain::{JobId, NewJob, NotificationEvent, PrintMethod};
use crate::error::{AppError, Result};
use crate::port::{FileStore, JobRepository, NotificationOutbox, TimeProvider, TokenProvider};
use std::path::PathBuf;
use tracing::{info, warn};

#[path = "submission_test.rs"]
#[cfg(test)]
mod submission_test;

/// Bounded retries for the unlikely confirmation-token collision
const TOKEN_INSERT_ATTEMPTS: u32 = 3;

/// Submission request (validated field-by-field before any write)
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub student_name: String,
    pub student_email: String,
    pub discipline: String,
    pub class_project: Option<String>,
    pub print_method: PrintMethod,
    pub color: String,
    /// Where the upload currently sits (the surface's temp location)
    pub source_path: PathBuf,
    pub original_filename: String,
    pub file_size: i64,
}

/// Collect every problem with a submission; empty means acceptable.
pub fn validate_request(req: &SubmissionRequest, config: &LabConfig) -> Vec<String> {
    let mut problems = Vec::new();

    if req.student_name.trim().is_empty()
        || req.student_email.trim().is_empty()
        || req.discipline.trim().is_empty()
        || req.color.trim().is_empty()
    {
        problems.push("All required fields must be filled".to_string());
    }

    if !is_valid_email(&req.student_email) {
        problems.push("Valid email address required".to_string());
    }

    if !req
        .print_method
        .colors()
        .iter()
        .any(|c| *c == req.color)
    {
        problems.push(format!(
            "Color '{}' is not available for {}",
            req.color,
            req.print_method.display_name()
        ));
    }

    if !config.upload.extension_allowed(&req.original_filename) {
        problems.push(format!(
            "Invalid file type. Allowed: {}",
            config.upload.allowed_extensions.join(", ")
        ));
    }

    if req.file_size <= 0 {
        problems.push("File upload required".to_string());
    } else if req.file_size > config.upload.max_file_size {
        problems.push(format!(
            "File too large (max {}MB)",
            config.upload.max_file_size / (1024 * 1024)
        ));
    }

    problems
}

/// Minimal RFC-agnostic email shape check: one '@', non-empty local
/// part, dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        _ => false,
    }
}

/// Execute the submission use case.
pub async fn execute(
    repo: &dyn JobRepository,
    outbox: &dyn NotificationOutbox,
    files: &dyn FileStore,
    tokens: &dyn TokenProvider,
    clock: &dyn TimeProvider,
    config: &LabConfig,
    req: SubmissionRequest,
) -> Result<JobId> {
    let problems = validate_request(&req, config);
    if !problems.is_empty() {
        return Err(AppError::Validation(problems.join(", ")));
    }

    let created_at = clock.now_millis();

    // Unique index on confirmation_token backs the retry loop.
    let mut job_id: Option<JobId> = None;
    for attempt in 1..=TOKEN_INSERT_ATTEMPTS {
        let new_job = NewJob {
            student_name: req.student_name.clone(),
            student_email: req.student_email.clone(),
            discipline: req.discipline.clone(),
            class_project: req.class_project.clone(),
            print_method: req.print_method,
            color: req.color.clone(),
            original_filename: req.original_filename.clone(),
            file_size: req.file_size,
            confirmation_token: tokens.generate(config.token_length),
            created_at,
        };

        match repo.insert(&new_job).await {
            Ok(id) => {
                job_id = Some(id);
                break;
            }
            Err(AppError::Conflict(_)) if attempt < TOKEN_INSERT_ATTEMPTS => {
                warn!(attempt, "confirmation token collided, regenerating");
            }
            Err(e) => return Err(e),
        }
    }
    let job_id = job_id.ok_or_else(|| {
        AppError::Internal("could not allocate a unique confirmation token".to_string())
    })?;

    // Store the model file; on failure the job stays `uploaded` and the
    // submitter sees a persistence error.
    let stored_name = stored_filename_for(job_id, created_at, &req.original_filename);
    files.store(&req.source_path, &stored_name).await?;

    repo.mark_received(job_id, &stored_name).await?;

    let job = repo
        .find_by_id(job_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("job {} missing after insert", job_id)))?;

    if let Err(e) = outbox
        .enqueue(&NotificationEvent::JobSubmitted { job })
        .await
    {
        warn!(job_id, error = %e, "failed to queue submission notification");
    }

    info!(job_id, stored_name = %stored_name, "print request submitted");
    Ok(job_id)
}
