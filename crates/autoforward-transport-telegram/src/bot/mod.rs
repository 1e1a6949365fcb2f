/// Command and conversation handlers
pub mod handlers;
/// Job status transport bound to a chat
pub mod job_transport;
/// Resilient messaging with automatic retry for Telegram API operations
pub mod resilient;
/// Shared relay state injected into handlers
pub mod state;
/// Static reply texts
pub mod views;

pub use job_transport::TelegramJobTransport;
pub use state::RelayContext;
