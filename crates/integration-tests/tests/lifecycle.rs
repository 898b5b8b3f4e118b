//! Full job lifecycle against real SQLite and disk storage:
//! submit -> price/approve -> confirm -> print stages -> pickup.

use std::sync::Arc;

use printlab_core::application::confirmation::{self, ConfirmAction};
use printlab_core::application::{review, submission, Session, SubmissionRequest};
use printlab_core::config::LabConfig;
use printlab_core::domain::{AuditAction, JobStatus, PrintMethod};
use printlab_core::error::AppError;
use printlab_core::port::{FileStore, HexTokenProvider, JobRepository, SystemTimeProvider};
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

async fn submit(lab: &Lab, method: PrintMethod, color: &str) -> i64 {
    let source = lab.dir.path().join("bracket.stl");
    tokio::fs::write(&source, b"solid bracket").await.unwrap();

    submission::execute(
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
            class_project: Some("Design 101".to_string()),
            print_method: method,
            color: color.to_string(),
            source_path: source,
            original_filename: "bracket.stl".to_string(),
            file_size: 13,
        },
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_filament_job_full_lifecycle() {
    let lab = setup().await;
    let staff = Session::staff("sam");

    // Submit: file lands in storage, job lands in `pending`
    let job_id = submit(&lab, PrintMethod::Filament, "Black").await;
    let job = lab.repo.find_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Pending);

    let stored = job.stored_filename.clone().unwrap();
    assert!(stored.starts_with(&format!("job_{}_", job_id)));
    assert!(stored.ends_with(".stl"));
    assert!(lab.files.exists(&stored).await.unwrap());

    // Approve: 50g filament at $0.10/g + 2h at $2.00/h = $9.00
    let cost = review::approve(
        &lab.repo,
        &lab.outbox,
        &lab.config,
        &staff,
        review::ApproveRequest {
            job_id,
            weight_grams: 50.0,
            time_hours: 2.0,
        },
    )
    .await
    .unwrap();
    assert_eq!(cost, 9.0);

    let job = lab.repo.find_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Approved);
    assert_eq!(job.cost, Some(9.0));

    // Student confirms via the mailed token
    confirmation::resolve(&lab.repo, &job.confirmation_token, ConfirmAction::Confirm)
        .await
        .unwrap();
    let job = lab.repo.find_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Confirmed);

    // Staff walk the job through the print stages
    for status in [
        JobStatus::Queued,
        JobStatus::Printing,
        JobStatus::Completed,
        JobStatus::PickedUp,
    ] {
        review::update_status(&lab.repo, &lab.outbox, &staff, job_id, status)
            .await
            .unwrap();
        let job = lab.repo.find_by_id(job_id).await.unwrap().unwrap();
        assert_eq!(job.status, status);
    }

    // Picked up is terminal
    let err = review::update_status(&lab.repo, &lab.outbox, &staff, job_id, JobStatus::Queued)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Domain(_)), "got: {:?}", err);

    // One audit entry per state change, newest first
    let log = lab.repo.audit_log(job_id).await.unwrap();
    assert_eq!(log.len(), 8);
    assert_eq!(log[0].new_status, Some(JobStatus::PickedUp));
    assert_eq!(log[7].action, AuditAction::Created);
}

#[tokio::test]
async fn test_small_resin_job_gets_the_minimum_charge() {
    let lab = setup().await;
    let staff = Session::staff("sam");

    let job_id = submit(&lab, PrintMethod::Resin, "Clear").await;

    // 5g resin at $0.20/g + 0.25h at $2.00/h = $1.50, below the $3 floor
    let cost = review::approve(
        &lab.repo,
        &lab.outbox,
        &lab.config,
        &staff,
        review::ApproveRequest {
            job_id,
            weight_grams: 5.0,
            time_hours: 0.25,
        },
    )
    .await
    .unwrap();
    assert_eq!(cost, 3.0);
}

#[tokio::test]
async fn test_review_requires_a_staff_session() {
    let lab = setup().await;

    let job_id = submit(&lab, PrintMethod::Filament, "Red").await;

    let err = review::approve(
        &lab.repo,
        &lab.outbox,
        &lab.config,
        &Session::Anonymous,
        review::ApproveRequest {
            job_id,
            weight_grams: 10.0,
            time_hours: 1.0,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    // Untouched by the failed call
    let job = lab.repo.find_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Pending);
}

#[tokio::test]
async fn test_rejection_records_the_reason() {
    let lab = setup().await;
    let staff = Session::staff("sam");

    let job_id = submit(&lab, PrintMethod::Filament, "Blue").await;

    review::reject(&lab.repo, &lab.outbox, &staff, job_id, "walls too thin to print")
        .await
        .unwrap();

    let job = lab.repo.find_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Rejected);
    assert_eq!(job.rejection_reason.as_deref(), Some("walls too thin to print"));

    // Rejected is terminal: no re-approval
    let err = review::approve(
        &lab.repo,
        &lab.outbox,
        &lab.config,
        &staff,
        review::ApproveRequest {
            job_id,
            weight_grams: 10.0,
            time_hours: 1.0,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Domain(_)));
}

#[tokio::test]
async fn test_manual_update_only_accepts_staff_stages() {
    let lab = setup().await;
    let staff = Session::staff("sam");

    let job_id = submit(&lab, PrintMethod::Filament, "Green").await;

    // `approved` is reached through pricing, never set by hand
    let err = review::update_status(&lab.repo, &lab.outbox, &staff, job_id, JobStatus::Approved)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // A pending job can jump straight onto the printer
    review::update_status(&lab.repo, &lab.outbox, &staff, job_id, JobStatus::Printing)
        .await
        .unwrap();
    let job = lab.repo.find_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Printing);
}
