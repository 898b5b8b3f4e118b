//! Token confirmation: idempotent resolution, cancellation, and the
//! guards around unknown or already-processed tokens.

use std::sync::Arc;

use printlab_core::application::confirmation::{self, ConfirmAction};
use printlab_core::application::{review, submission, Session, SubmissionRequest};
use printlab_core::config::LabConfig;
use printlab_core::domain::{JobStatus, PrintMethod};
use printlab_core::error::AppError;
use printlab_core::port::{HexTokenProvider, JobRepository, SystemTimeProvider};
use printlab_infra_fs::LocalFileStore;
use printlab_infra_sqlite::{
    create_pool, run_migrations, SqliteJobRepository, SqliteNotificationOutbox,
};

struct Lab {
    repo: SqliteJobRepository,
    outbox: SqliteNotificationOutbox,
    files: LocalFileStore,
    config: LabConfig,
    dir: tempfile::TempDir,
}

async fn setup() -> Lab {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    Lab {
        repo: SqliteJobRepository::new(pool.clone(), Arc::new(SystemTimeProvider)),
        outbox: SqliteNotificationOutbox::new(pool, Arc::new(SystemTimeProvider)),
        files: LocalFileStore::new(dir.path().join("uploads")),
        config: LabConfig::default(),
        dir,
    }
}

/// Submit and approve, returning (job_id, confirmation_token).
async fn approved_job(lab: &Lab) -> (i64, String) {
    let source = lab.dir.path().join("bracket.stl");
    tokio::fs::write(&source, b"solid bracket").await.unwrap();

    let job_id = submission::execute(
        &lab.repo,
        &lab.outbox,
        &lab.files,
        &HexTokenProvider,
        &SystemTimeProvider,
        &lab.config,
        SubmissionRequest {
            student_name: "Ada Lovelace".to_string(),
            student_email: "ada@university.edu".to_string(),
            discipline: "Engineering".to_string(),
            class_project: None,
            print_method: PrintMethod::Filament,
            color: "Black".to_string(),
            source_path: source,
            original_filename: "bracket.stl".to_string(),
            file_size: 13,
        },
    )
    .await
    .unwrap();

    review::approve(
        &lab.repo,
        &lab.outbox,
        &lab.config,
        &Session::staff("sam"),
        review::ApproveRequest {
            job_id,
            weight_grams: 20.0,
            time_hours: 1.0,
        },
    )
    .await
    .unwrap();

    let job = lab.repo.find_by_id(job_id).await.unwrap().unwrap();
    (job_id, job.confirmation_token)
}

#[tokio::test]
async fn test_second_confirmation_changes_nothing() {
    let lab = setup().await;
    let (job_id, token) = approved_job(&lab).await;

    confirmation::resolve(&lab.repo, &token, ConfirmAction::Confirm)
        .await
        .unwrap();
    let audit_len = lab.repo.audit_log(job_id).await.unwrap().len();

    let err = confirmation::resolve(&lab.repo, &token, ConfirmAction::Confirm)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
    assert!(err.to_string().contains("already been processed"));

    let job = lab.repo.find_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Confirmed);
    assert_eq!(lab.repo.audit_log(job_id).await.unwrap().len(), audit_len);
}

#[tokio::test]
async fn test_cancel_declines_the_quote_for_good() {
    let lab = setup().await;
    let (job_id, token) = approved_job(&lab).await;

    confirmation::resolve(&lab.repo, &token, ConfirmAction::Cancel)
        .await
        .unwrap();

    let job = lab.repo.find_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Cancelled);

    // Cancelled is terminal for staff too
    let err = review::update_status(
        &lab.repo,
        &lab.outbox,
        &Session::staff("sam"),
        job_id,
        JobStatus::Queued,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Domain(_)));

    // And the token is spent
    let err = confirmation::resolve(&lab.repo, &token, ConfirmAction::Confirm)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
async fn test_unknown_token_is_not_found() {
    let lab = setup().await;

    let err = confirmation::resolve(&lab.repo, "no-such-token", ConfirmAction::Confirm)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(err.to_string().contains("invalid confirmation link"));
}

#[tokio::test]
async fn test_confirmation_needs_a_quote_first() {
    let lab = setup().await;

    let source = lab.dir.path().join("bracket.stl");
    tokio::fs::write(&source, b"solid bracket").await.unwrap();

    let job_id = submission::execute(
        &lab.repo,
        &lab.outbox,
        &lab.files,
        &HexTokenProvider,
        &SystemTimeProvider,
        &lab.config,
        SubmissionRequest {
            student_name: "Ada Lovelace".to_string(),
            student_email: "ada@university.edu".to_string(),
            discipline: "Engineering".to_string(),
            class_project: None,
            print_method: PrintMethod::Filament,
            color: "Black".to_string(),
            source_path: source,
            original_filename: "bracket.stl".to_string(),
            file_size: 13,
        },
    )
    .await
    .unwrap();

    let job = lab.repo.find_by_id(job_id).await.unwrap().unwrap();

    // Still pending review: the token exists but resolves to nothing
    let err = confirmation::resolve(&lab.repo, &job.confirmation_token, ConfirmAction::Confirm)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    let job = lab.repo.find_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Pending);
}

#[tokio::test]
async fn test_lookup_by_token() {
    let lab = setup().await;
    let (job_id, token) = approved_job(&lab).await;

    let job = confirmation::lookup(&lab.repo, &token).await.unwrap().unwrap();
    assert_eq!(job.id, job_id);
    assert_eq!(job.status, JobStatus::Approved);

    assert!(confirmation::lookup(&lab.repo, "nope")
        .await
        .unwrap()
        .is_none());
}
