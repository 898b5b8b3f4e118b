// Application Layer - Lifecycle Engine use cases

pub mod confirmation;
pub mod notification;
pub mod review;
pub mod session;
pub mod submission;

// Re-exports
pub use notification::{shutdown_channel, OutboxDispatcher, ShutdownSender, ShutdownToken};
pub use session::Session;
pub use submission::SubmissionRequest;
