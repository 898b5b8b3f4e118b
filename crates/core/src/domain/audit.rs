// Audit Log Entry - immutable append-only record of job state changes

use crate::domain::error::DomainError;
use crate::domain::{JobId, JobStatus};
use serde::{Deserialize, Serialize};

/// What the lifecycle engine did to the job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Approved,
    Rejected,
    StatusChanged,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuditAction::Created => "created",
            AuditAction::Approved => "approved",
            AuditAction::Rejected => "rejected",
            AuditAction::StatusChanged => "status_changed",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for AuditAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(AuditAction::Created),
            "approved" => Ok(AuditAction::Approved),
            "rejected" => Ok(AuditAction::Rejected),
            "status_changed" => Ok(AuditAction::StatusChanged),
            other => Err(DomainError::UnknownAction(other.to_string())),
        }
    }
}

/// One audit record; never updated or deleted after insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub job_id: JobId,
    pub action: AuditAction,
    pub old_status: Option<JobStatus>,
    pub new_status: Option<JobStatus>,
    pub details: Option<String>,
    pub timestamp: i64, // epoch ms
}
