// Domain Layer - entities, value types and the status state machine

pub mod audit;
pub mod error;
pub mod event;
pub mod job;
pub mod pricing;
pub mod transition;

pub use audit::{AuditAction, AuditEntry};
pub use error::DomainError;
pub use event::NotificationEvent;
pub use job::{Job, JobId, JobStatus, NewJob, PrintMethod};
pub use pricing::{calculate_cost, PricingConfig};
