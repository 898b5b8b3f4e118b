// Notification Dispatch - outbox consumer

pub mod dispatcher;
pub mod shutdown;

pub use dispatcher::OutboxDispatcher;
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
