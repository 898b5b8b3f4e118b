// Notification Events
//
// Emitted by the lifecycle engine into the outbox after the triggering
// persistence write commits; consumed by the notification dispatcher.
// Each event carries the full job record so rendering needs no reads.

use crate::domain::Job;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationEvent {
    JobSubmitted { job: Job },
    JobApproved { job: Job, confirmation_url: String },
    JobRejected { job: Job },
    JobCompleted { job: Job },
}

impl NotificationEvent {
    pub fn job(&self) -> &Job {
        match self {
            NotificationEvent::JobSubmitted { job }
            | NotificationEvent::JobApproved { job, .. }
            | NotificationEvent::JobRejected { job }
            | NotificationEvent::JobCompleted { job } => job,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NotificationEvent::JobSubmitted { .. } => "job_submitted",
            NotificationEvent::JobApproved { .. } => "job_approved",
            NotificationEvent::JobRejected { .. } => "job_rejected",
            NotificationEvent::JobCompleted { .. } => "job_completed",
        }
    }
}
