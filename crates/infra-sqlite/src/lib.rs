// PrintLab SQLite Infrastructure
// Implements the JobRepository and NotificationOutbox ports

pub mod connection;
pub mod job_repository;
pub mod migration;
pub mod outbox;

pub use connection::create_pool;
pub use job_repository::SqliteJobRepository;
pub use migration::run_migrations;
pub use outbox::SqliteNotificationOutbox;
