// Status transition table
//
// The original workflow let staff write any status string at any time;
// here every transition is validated against this table and illegal
// ones fail with a typed error. Terminal statuses (rejected, cancelled,
// picked_up) admit no outgoing transition.

use crate::domain::error::{DomainError, Result};
use crate::domain::JobStatus;

/// Statuses staff may set manually from the dashboard.
pub const STAFF_STAGES: [JobStatus; 4] = [
    JobStatus::Queued,
    JobStatus::Printing,
    JobStatus::Completed,
    JobStatus::PickedUp,
];

/// Whether `from -> to` is a legal transition.
pub fn is_allowed(from: JobStatus, to: JobStatus) -> bool {
    if from.is_terminal() || from == to {
        return false;
    }

    match (from, to) {
        // File stored successfully after submission
        (JobStatus::Uploaded, JobStatus::Pending) => true,
        // Staff review outcome
        (JobStatus::Pending, JobStatus::Approved | JobStatus::Rejected) => true,
        // Token-based confirmation outcome
        (JobStatus::Approved, JobStatus::Confirmed | JobStatus::Cancelled) => true,
        // Staff manual stage updates from any non-terminal status
        (_, JobStatus::Queued | JobStatus::Printing | JobStatus::Completed | JobStatus::PickedUp) => {
            true
        }
        _ => false,
    }
}

/// Validate a transition, returning a typed error when illegal.
pub fn ensure_allowed(from: JobStatus, to: JobStatus) -> Result<()> {
    if is_allowed(from, to) {
        Ok(())
    } else {
        Err(DomainError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_workflow_is_allowed() {
        assert!(is_allowed(JobStatus::Uploaded, JobStatus::Pending));
        assert!(is_allowed(JobStatus::Pending, JobStatus::Approved));
        assert!(is_allowed(JobStatus::Pending, JobStatus::Rejected));
        assert!(is_allowed(JobStatus::Approved, JobStatus::Confirmed));
        assert!(is_allowed(JobStatus::Approved, JobStatus::Cancelled));
        assert!(is_allowed(JobStatus::Confirmed, JobStatus::Queued));
        assert!(is_allowed(JobStatus::Queued, JobStatus::Printing));
        assert!(is_allowed(JobStatus::Printing, JobStatus::Completed));
        assert!(is_allowed(JobStatus::Completed, JobStatus::PickedUp));
    }

    #[test]
    fn terminal_statuses_admit_nothing() {
        for from in [JobStatus::Rejected, JobStatus::Cancelled, JobStatus::PickedUp] {
            for to in JobStatus::ALL {
                assert!(!is_allowed(from, to), "{} -> {} must be illegal", from, to);
            }
        }
    }

    #[test]
    fn review_requires_pending() {
        assert!(!is_allowed(JobStatus::Uploaded, JobStatus::Approved));
        assert!(!is_allowed(JobStatus::Confirmed, JobStatus::Rejected));
    }

    #[test]
    fn confirmation_requires_approved() {
        assert!(!is_allowed(JobStatus::Pending, JobStatus::Confirmed));
        assert!(!is_allowed(JobStatus::Confirmed, JobStatus::Cancelled));
    }

    #[test]
    fn ensure_allowed_reports_the_pair() {
        let err = ensure_allowed(JobStatus::Rejected, JobStatus::Queued).unwrap_err();
        assert!(err.to_string().contains("rejected -> queued"));
    }
}
