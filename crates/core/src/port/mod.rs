// Port Layer - Interfaces for external dependencies

pub mod file_store;
pub mod job_repository;
pub mod notifier;
pub mod outbox;
pub mod time_provider;
pub mod token_provider;

// Re-exports
pub use file_store::FileStore;
pub use job_repository::JobRepository;
pub use notifier::{LogNotifier, Notifier};
pub use outbox::{NotificationOutbox, OutboxEntry};
pub use time_provider::{SystemTimeProvider, TimeProvider};
pub use token_provider::{HexTokenProvider, TokenProvider};
