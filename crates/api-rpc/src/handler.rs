//! RPC Method Handlers
//!
//! Implements the business logic for each JSON-RPC method.

use crate::error::{throttled, to_rpc_error};
use crate::rate_limiter::RateLimiter;
use crate::session::SessionManager;
use crate::types::{
    ApproveRequest, ApproveResponse, AuditRequest, AuditResponse, ConfirmRequest, ConfirmResponse,
    JobView, ListRequest, ListResponse, LoginRequest, LoginResponse, LogoutRequest,
    LogoutResponse, LookupRequest, LookupResponse, RejectRequest, RejectResponse,
    SetStatusRequest, SetStatusResponse, SubmitRequest, SubmitResponse,
};
use jsonrpsee::types::ErrorObjectOwned;
use printlab_core::application::{confirmation, review, submission, SubmissionRequest};
use printlab_core::config::LabConfig;
use printlab_core::domain::{JobStatus, PrintMethod};
use printlab_core::error::AppError;
use printlab_core::port::{
    FileStore, JobRepository, NotificationOutbox, TimeProvider, TokenProvider,
};
use std::path::PathBuf;
use std::sync::Arc;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    repo: Arc<dyn JobRepository>,
    outbox: Arc<dyn NotificationOutbox>,
    files: Arc<dyn FileStore>,
    tokens: Arc<dyn TokenProvider>,
    clock: Arc<dyn TimeProvider>,
    config: Arc<LabConfig>,
    sessions: Arc<SessionManager>,
    rate_limiter: RateLimiter,
}

impl RpcHandler {
    pub fn new(
        repo: Arc<dyn JobRepository>,
        outbox: Arc<dyn NotificationOutbox>,
        files: Arc<dyn FileStore>,
        tokens: Arc<dyn TokenProvider>,
        clock: Arc<dyn TimeProvider>,
        config: Arc<LabConfig>,
    ) -> Self {
        // Default: 20 burst, 5 req/sec on the public submission method
        let max_burst: u32 = std::env::var("PRINTLAB_RATE_LIMIT_BURST")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(20);

        let rate_per_sec: u32 = std::env::var("PRINTLAB_RATE_LIMIT_RATE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        let sessions = Arc::new(SessionManager::new(
            tokens.clone(),
            config.staff_password.clone(),
        ));

        Self {
            repo,
            outbox,
            files,
            tokens,
            clock,
            config,
            sessions,
            rate_limiter: RateLimiter::new(max_burst, rate_per_sec),
        }
    }

    /// job.submit.v1
    pub async fn submit(&self, params: SubmitRequest) -> Result<SubmitResponse, ErrorObjectOwned> {
        // The only unauthenticated write path, so it is the throttled one.
        if !self.rate_limiter.check().await {
            return Err(throttled());
        }

        let print_method: PrintMethod = params
            .print_method
            .parse()
            .map_err(|e: printlab_core::domain::DomainError| to_rpc_error(e.into()))?;

        let source_path = PathBuf::from(&params.file_path);
        let original_filename = params.original_filename.unwrap_or_else(|| {
            source_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

        // A missing upload surfaces as the size-zero validation problem.
        let file_size = tokio::fs::metadata(&source_path)
            .await
            .map(|m| m.len() as i64)
            .unwrap_or(0);

        let req = SubmissionRequest {
            student_name: params.student_name,
            student_email: params.student_email,
            discipline: params.discipline,
            class_project: params.class_project,
            print_method,
            color: params.color,
            source_path,
            original_filename,
            file_size,
        };

        let job_id = submission::execute(
            self.repo.as_ref(),
            self.outbox.as_ref(),
            self.files.as_ref(),
            self.tokens.as_ref(),
            self.clock.as_ref(),
            &self.config,
            req,
        )
        .await
        .map_err(to_rpc_error)?;

        Ok(SubmitResponse {
            job_id,
            status: JobStatus::Pending.to_string(),
        })
    }

    /// staff.login.v1
    pub async fn login(&self, params: LoginRequest) -> Result<LoginResponse, ErrorObjectOwned> {
        let session_token = self
            .sessions
            .login(&params.password, &params.staff_name)
            .await
            .map_err(to_rpc_error)?;

        Ok(LoginResponse { session_token })
    }

    /// staff.logout.v1
    pub async fn logout(&self, params: LogoutRequest) -> Result<LogoutResponse, ErrorObjectOwned> {
        let logged_out = self.sessions.logout(&params.session_token).await;
        Ok(LogoutResponse { logged_out })
    }

    /// job.approve.v1
    pub async fn approve(
        &self,
        params: ApproveRequest,
    ) -> Result<ApproveResponse, ErrorObjectOwned> {
        let session = self
            .sessions
            .resolve(&params.session_token)
            .await
            .map_err(to_rpc_error)?;

        let cost = review::approve(
            self.repo.as_ref(),
            self.outbox.as_ref(),
            &self.config,
            &session,
            review::ApproveRequest {
                job_id: params.job_id,
                weight_grams: params.weight_grams,
                time_hours: params.time_hours,
            },
        )
        .await
        .map_err(to_rpc_error)?;

        Ok(ApproveResponse {
            job_id: params.job_id,
            cost,
            status: JobStatus::Approved.to_string(),
        })
    }

    /// job.reject.v1
    pub async fn reject(&self, params: RejectRequest) -> Result<RejectResponse, ErrorObjectOwned> {
        let session = self
            .sessions
            .resolve(&params.session_token)
            .await
            .map_err(to_rpc_error)?;

        review::reject(
            self.repo.as_ref(),
            self.outbox.as_ref(),
            &session,
            params.job_id,
            &params.reason,
        )
        .await
        .map_err(to_rpc_error)?;

        Ok(RejectResponse {
            job_id: params.job_id,
            status: JobStatus::Rejected.to_string(),
        })
    }

    /// job.set_status.v1
    pub async fn set_status(
        &self,
        params: SetStatusRequest,
    ) -> Result<SetStatusResponse, ErrorObjectOwned> {
        let session = self
            .sessions
            .resolve(&params.session_token)
            .await
            .map_err(to_rpc_error)?;

        let new_status: JobStatus = params
            .status
            .parse()
            .map_err(|e: printlab_core::domain::DomainError| to_rpc_error(e.into()))?;

        review::update_status(
            self.repo.as_ref(),
            self.outbox.as_ref(),
            &session,
            params.job_id,
            new_status,
        )
        .await
        .map_err(to_rpc_error)?;

        Ok(SetStatusResponse {
            job_id: params.job_id,
            status: new_status.to_string(),
        })
    }

    /// job.confirm.v1
    pub async fn confirm(
        &self,
        params: ConfirmRequest,
    ) -> Result<ConfirmResponse, ErrorObjectOwned> {
        let job_id = confirmation::resolve(self.repo.as_ref(), &params.token, params.action)
            .await
            .map_err(to_rpc_error)?;

        let job = self
            .repo
            .find_by_id(job_id)
            .await
            .map_err(to_rpc_error)?
            .ok_or_else(|| {
                to_rpc_error(AppError::Internal(format!(
                    "job {} missing after confirmation",
                    job_id
                )))
            })?;

        Ok(ConfirmResponse {
            job_id,
            status: job.status.to_string(),
        })
    }

    /// job.lookup.v1
    pub async fn lookup(&self, params: LookupRequest) -> Result<LookupResponse, ErrorObjectOwned> {
        let job = confirmation::lookup(self.repo.as_ref(), &params.token)
            .await
            .map_err(to_rpc_error)?;

        Ok(LookupResponse {
            job: job.map(JobView::from),
        })
    }

    /// job.list.v1
    pub async fn list(&self, params: ListRequest) -> Result<ListResponse, ErrorObjectOwned> {
        self.sessions
            .resolve(&params.session_token)
            .await
            .map_err(to_rpc_error)?;

        let filter = match params.status {
            Some(s) => Some(
                s.parse::<JobStatus>()
                    .map_err(|e| to_rpc_error(e.into()))?,
            ),
            None => None,
        };

        let jobs = self
            .repo
            .list_by_status(filter)
            .await
            .map_err(to_rpc_error)?;

        Ok(ListResponse {
            jobs: jobs.into_iter().map(JobView::from).collect(),
        })
    }

    /// job.audit.v1
    pub async fn audit(&self, params: AuditRequest) -> Result<AuditResponse, ErrorObjectOwned> {
        self.sessions
            .resolve(&params.session_token)
            .await
            .map_err(to_rpc_error)?;

        let entries = self
            .repo
            .audit_log(params.job_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(AuditResponse {
            job_id: params.job_id,
            entries: entries.into_iter().map(Into::into).collect(),
        })
    }
}
