// Job Domain Model

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};

/// Job ID (SQLite rowid, assigned on insert)
pub type JobId = i64;

/// Print method offered by the lab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintMethod {
    Filament,
    Resin,
}

impl PrintMethod {
    /// Colors stocked for this method; submissions must pick from this set.
    pub fn colors(&self) -> &'static [&'static str] {
        match self {
            PrintMethod::Filament => &["Black", "White", "Red", "Blue", "Green", "Yellow"],
            PrintMethod::Resin => &["Clear", "Black", "White", "Gray"],
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PrintMethod::Filament => "Filament (FDM)",
            PrintMethod::Resin => "Resin (SLA)",
        }
    }
}

impl std::fmt::Display for PrintMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrintMethod::Filament => write!(f, "filament"),
            PrintMethod::Resin => write!(f, "resin"),
        }
    }
}

impl std::str::FromStr for PrintMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "filament" => Ok(PrintMethod::Filament),
            "resin" => Ok(PrintMethod::Resin),
            other => Err(DomainError::UnknownMethod(other.to_string())),
        }
    }
}

/// Job status over the linear print workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Uploaded,
    Pending,
    Approved,
    Rejected,
    Confirmed,
    Cancelled,
    Queued,
    Printing,
    Completed,
    PickedUp,
}

impl JobStatus {
    /// Terminal statuses admit no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Rejected | JobStatus::Cancelled | JobStatus::PickedUp
        )
    }

    /// Human label, matching the dashboard wording.
    pub fn display_name(&self) -> &'static str {
        match self {
            JobStatus::Uploaded => "Uploaded",
            JobStatus::Pending => "Pending Review",
            JobStatus::Approved => "Approved",
            JobStatus::Rejected => "Rejected",
            JobStatus::Confirmed => "Confirmed",
            JobStatus::Cancelled => "Cancelled",
            JobStatus::Queued => "In Queue",
            JobStatus::Printing => "Printing",
            JobStatus::Completed => "Completed",
            JobStatus::PickedUp => "Picked Up",
        }
    }

    pub const ALL: [JobStatus; 10] = [
        JobStatus::Uploaded,
        JobStatus::Pending,
        JobStatus::Approved,
        JobStatus::Rejected,
        JobStatus::Confirmed,
        JobStatus::Cancelled,
        JobStatus::Queued,
        JobStatus::Printing,
        JobStatus::Completed,
        JobStatus::PickedUp,
    ];
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Uploaded => "uploaded",
            JobStatus::Pending => "pending",
            JobStatus::Approved => "approved",
            JobStatus::Rejected => "rejected",
            JobStatus::Confirmed => "confirmed",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Queued => "queued",
            JobStatus::Printing => "printing",
            JobStatus::Completed => "completed",
            JobStatus::PickedUp => "picked_up",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for JobStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uploaded" => Ok(JobStatus::Uploaded),
            "pending" => Ok(JobStatus::Pending),
            "approved" => Ok(JobStatus::Approved),
            "rejected" => Ok(JobStatus::Rejected),
            "confirmed" => Ok(JobStatus::Confirmed),
            "cancelled" => Ok(JobStatus::Cancelled),
            "queued" => Ok(JobStatus::Queued),
            "printing" => Ok(JobStatus::Printing),
            "completed" => Ok(JobStatus::Completed),
            "picked_up" => Ok(JobStatus::PickedUp),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

/// Job Entity
///
/// Submitter info, print spec and file reference are immutable after
/// creation; only status, pricing fields, rejection_reason and the
/// stored filename change, and only through the lifecycle engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,

    // Submitter
    pub student_name: String,
    pub student_email: String,
    pub discipline: String,
    pub class_project: Option<String>,

    // Print spec
    pub print_method: PrintMethod,
    pub color: String,

    // File reference
    pub stored_filename: Option<String>,
    pub original_filename: String,
    pub file_size: i64,

    pub status: JobStatus,

    // Pricing: all-null until approval, then all-set (never recomputed)
    pub weight_grams: Option<f64>,
    pub time_hours: Option<f64>,
    pub cost: Option<f64>,

    pub confirmation_token: String,
    pub rejection_reason: Option<String>,

    pub created_at: i64, // epoch ms
    pub updated_at: i64,
}

impl Job {
    /// True once approval has priced the job.
    pub fn has_pricing(&self) -> bool {
        self.weight_grams.is_some() && self.time_hours.is_some() && self.cost.is_some()
    }
}

/// Fields required to create a job row (status starts as `uploaded`)
#[derive(Debug, Clone)]
pub struct NewJob {
    pub student_name: String,
    pub student_email: String,
    pub discipline: String,
    pub class_project: Option<String>,
    pub print_method: PrintMethod,
    pub color: String,
    pub original_filename: String,
    pub file_size: i64,
    pub confirmation_token: String,
    pub created_at: i64,
}

/// Derived on-disk name for an uploaded model file.
///
/// `job_{id}_{YYYYMMDD}.{ext}` - unique per job since the id is unique,
/// so same-day re-submissions cannot collide.
pub fn stored_filename_for(id: JobId, now_millis: i64, original_filename: &str) -> String {
    let date = chrono::DateTime::from_timestamp_millis(now_millis)
        .unwrap_or_default()
        .format("%Y%m%d");

    let ext = std::path::Path::new(original_filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("dat")
        .to_lowercase();

    format!("job_{}_{}.{}", id, date, ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_round_trips_through_display() {
        for status in JobStatus::ALL {
            let parsed = JobStatus::from_str(&status.to_string()).unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(JobStatus::from_str("exploded").is_err());
    }

    #[test]
    fn terminal_statuses() {
        assert!(JobStatus::Rejected.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
        assert!(JobStatus::PickedUp.is_terminal());
        assert!(!JobStatus::Completed.is_terminal());
        assert!(!JobStatus::Pending.is_terminal());
    }

    #[test]
    fn stored_filename_uses_job_id_and_date() {
        // 2024-03-05 UTC
        let millis = 1_709_600_000_000;
        let name = stored_filename_for(42, millis, "Bracket.STL");
        assert_eq!(name, "job_42_20240305.stl");
    }

    #[test]
    fn stored_filename_falls_back_without_extension() {
        let name = stored_filename_for(7, 0, "model");
        assert_eq!(name, "job_7_19700101.dat");
    }
}
