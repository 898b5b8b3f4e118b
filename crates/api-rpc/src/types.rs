//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results.

use printlab_core::domain::{AuditEntry, Job};
use serde::{Deserialize, Serialize};

/// job.submit.v1 - Submit a print request
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub student_name: String,
    pub student_email: String,
    pub discipline: String,
    #[serde(default)]
    pub class_project: Option<String>,
    pub print_method: String,
    pub color: String,
    /// Path to the uploaded model file on this host
    pub file_path: String,
    /// Defaults to the basename of `file_path`
    #[serde(default)]
    pub original_filename: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    pub job_id: i64,
    pub status: String,
}

/// staff.login.v1 - Open a staff session
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
    #[serde(default = "default_staff_name")]
    pub staff_name: String,
}

fn default_staff_name() -> String {
    "staff".to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub session_token: String,
}

/// staff.logout.v1 - Close a staff session
#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub session_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogoutResponse {
    pub logged_out: bool,
}

/// job.approve.v1 - Price and approve a pending job
#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub session_token: String,
    pub job_id: i64,
    pub weight_grams: f64,
    pub time_hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApproveResponse {
    pub job_id: i64,
    pub cost: f64,
    pub status: String,
}

/// job.reject.v1 - Reject a pending job
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub session_token: String,
    pub job_id: i64,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RejectResponse {
    pub job_id: i64,
    pub status: String,
}

/// job.set_status.v1 - Manual stage update from the dashboard
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub session_token: String,
    pub job_id: i64,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetStatusResponse {
    pub job_id: i64,
    pub status: String,
}

/// job.confirm.v1 - Resolve a mailed confirmation link
#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub token: String,
    /// "confirm" or "cancel"
    pub action: printlab_core::application::confirmation::ConfirmAction,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmResponse {
    pub job_id: i64,
    pub status: String,
}

/// job.lookup.v1 - Load the job behind a confirmation token
#[derive(Debug, Deserialize)]
pub struct LookupRequest {
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LookupResponse {
    pub job: Option<JobView>,
}

/// job.list.v1 - Staff dashboard listing
#[derive(Debug, Deserialize)]
pub struct ListRequest {
    pub session_token: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListResponse {
    pub jobs: Vec<JobView>,
}

/// job.audit.v1 - Full audit trail for one job
#[derive(Debug, Deserialize)]
pub struct AuditRequest {
    pub session_token: String,
    pub job_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditResponse {
    pub job_id: i64,
    pub entries: Vec<AuditView>,
}

/// Job as exposed over the wire. The confirmation token never leaves
/// the service except inside the mailed link.
#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    pub id: i64,
    pub student_name: String,
    pub student_email: String,
    pub discipline: String,
    pub class_project: Option<String>,
    pub print_method: String,
    pub color: String,
    pub original_filename: String,
    pub stored_filename: Option<String>,
    pub file_size: i64,
    pub status: String,
    pub weight_grams: Option<f64>,
    pub time_hours: Option<f64>,
    pub cost: Option<f64>,
    pub rejection_reason: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<Job> for JobView {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            student_name: job.student_name,
            student_email: job.student_email,
            discipline: job.discipline,
            class_project: job.class_project,
            print_method: job.print_method.to_string(),
            color: job.color,
            original_filename: job.original_filename,
            stored_filename: job.stored_filename,
            file_size: job.file_size,
            status: job.status.to_string(),
            weight_grams: job.weight_grams,
            time_hours: job.time_hours,
            cost: job.cost,
            rejection_reason: job.rejection_reason,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditView {
    pub id: i64,
    pub action: String,
    pub old_status: Option<String>,
    pub new_status: Option<String>,
    pub details: Option<String>,
    pub timestamp: i64,
}

impl From<AuditEntry> for AuditView {
    fn from(entry: AuditEntry) -> Self {
        Self {
            id: entry.id,
            action: entry.action.to_string(),
            old_status: entry.old_status.map(|s| s.to_string()),
            new_status: entry.new_status.map(|s| s.to_string()),
            details: entry.details,
            timestamp: entry.timestamp,
        }
    }
}
