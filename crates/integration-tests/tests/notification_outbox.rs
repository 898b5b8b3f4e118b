//! Outbox dispatch semantics: events survive until delivered, delivery
//! failures park after retries, and notification trouble never touches
//! job state.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use printlab_core::application::confirmation::{self, ConfirmAction};
use printlab_core::application::{review, submission, OutboxDispatcher, Session, SubmissionRequest};
use printlab_core::config::LabConfig;
use printlab_core::domain::{JobStatus, NotificationEvent, PrintMethod};
use printlab_core::error::AppError;
use printlab_core::port::{
    HexTokenProvider, JobRepository, NotificationOutbox, Notifier, SystemTimeProvider,
};
use printlab_infra_fs::LocalFileStore;
use printlab_infra_sqlite::{
    create_pool, run_migrations, SqliteJobRepository, SqliteNotificationOutbox,
};

struct RecordingNotifier {
    labels: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    fn new() -> Self {
        Self {
            labels: Mutex::new(Vec::new()),
        }
    }

    fn recorded(&self) -> Vec<String> {
        self.labels.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, event: &NotificationEvent) -> printlab_core::Result<()> {
        self.labels.lock().unwrap().push(event.label().to_string());
        Ok(())
    }
}

struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _event: &NotificationEvent) -> printlab_core::Result<()> {
        Err(AppError::Internal("smtp unreachable".to_string()))
    }
}

struct Lab {
    repo: SqliteJobRepository,
    outbox: Arc<SqliteNotificationOutbox>,
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
        outbox: Arc::new(SqliteNotificationOutbox::new(
            pool,
            Arc::new(SystemTimeProvider),
        )),
        files: LocalFileStore::new(dir.path().join("uploads")),
        config: LabConfig::default(),
        dir,
    }
}

async fn submit(lab: &Lab) -> i64 {
    let source = lab.dir.path().join("bracket.stl");
    tokio::fs::write(&source, b"solid bracket").await.unwrap();

    submission::execute(
        &lab.repo,
        lab.outbox.as_ref(),
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
    .unwrap()
}

#[tokio::test]
async fn test_lifecycle_emits_submitted_approved_completed() {
    let lab = setup().await;
    let staff = Session::staff("sam");

    let job_id = submit(&lab).await;
    review::approve(
        &lab.repo,
        lab.outbox.as_ref(),
        &lab.config,
        &staff,
        review::ApproveRequest {
            job_id,
            weight_grams: 20.0,
            time_hours: 1.0,
        },
    )
    .await
    .unwrap();

    let job = lab.repo.find_by_id(job_id).await.unwrap().unwrap();
    confirmation::resolve(&lab.repo, &job.confirmation_token, ConfirmAction::Confirm)
        .await
        .unwrap();

    for status in [JobStatus::Queued, JobStatus::Printing, JobStatus::Completed] {
        review::update_status(&lab.repo, lab.outbox.as_ref(), &staff, job_id, status)
            .await
            .unwrap();
    }

    // The approval event carries the confirmation link
    let pending = lab.outbox.fetch_pending(10, 5).await.unwrap();
    let approved = pending
        .iter()
        .find_map(|e| match &e.event {
            NotificationEvent::JobApproved {
                confirmation_url, ..
            } => Some(confirmation_url.clone()),
            _ => None,
        })
        .unwrap();
    assert!(approved.contains("/confirm?token="));
    assert!(approved.contains(&job.confirmation_token));

    // Drain and check what a student would have been emailed
    let notifier = Arc::new(RecordingNotifier::new());
    let dispatcher = OutboxDispatcher::new(lab.outbox.clone(), notifier.clone());

    let dispatched = dispatcher.run_once().await.unwrap();
    assert_eq!(dispatched, 3);
    assert_eq!(
        notifier.recorded(),
        vec!["job_submitted", "job_approved", "job_completed"]
    );

    // Nothing left behind, nothing dispatched twice
    assert_eq!(dispatcher.run_once().await.unwrap(), 0);
    assert_eq!(notifier.recorded().len(), 3);
}

#[tokio::test]
async fn test_rejection_queues_exactly_one_rejection_notice() {
    let lab = setup().await;

    let job_id = submit(&lab).await;
    review::reject(
        &lab.repo,
        lab.outbox.as_ref(),
        &Session::staff("sam"),
        job_id,
        "unprintable overhangs",
    )
    .await
    .unwrap();

    let pending = lab.outbox.fetch_pending(10, 5).await.unwrap();
    let rejected: Vec<_> = pending
        .iter()
        .filter(|e| e.event.label() == "job_rejected")
        .collect();
    assert_eq!(rejected.len(), 1);
    match &rejected[0].event {
        NotificationEvent::JobRejected { job } => {
            assert_eq!(job.rejection_reason.as_deref(), Some("unprintable overhangs"));
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn test_delivery_failure_retries_then_parks() {
    let lab = setup().await;
    let job_id = submit(&lab).await;

    let dispatcher = OutboxDispatcher::new(lab.outbox.clone(), Arc::new(FailingNotifier));

    for _ in 0..5 {
        assert_eq!(dispatcher.run_once().await.unwrap(), 0);
    }

    // Five failed attempts: the row is parked, not retried forever
    assert!(lab.outbox.fetch_pending(10, 5).await.unwrap().is_empty());

    // The job itself never noticed
    let job = lab.repo.find_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Pending);
}

#[tokio::test]
async fn test_attempts_climb_one_per_failed_poll() {
    let lab = setup().await;
    submit(&lab).await;

    let dispatcher = OutboxDispatcher::new(lab.outbox.clone(), Arc::new(FailingNotifier));

    dispatcher.run_once().await.unwrap();
    let pending = lab.outbox.fetch_pending(10, 5).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].attempts, 1);

    dispatcher.run_once().await.unwrap();
    let pending = lab.outbox.fetch_pending(10, 5).await.unwrap();
    assert_eq!(pending[0].attempts, 2);
}
