//! Messaging platform contract.
//!
//! The core never talks to Telegram directly. It sequences calls against
//! these traits; the transport crate supplies the implementations.

use crate::error::PlatformError;
use async_trait::async_trait;
use futures_util::stream::BoxStream;

/// A message read from a source channel's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMessage {
    /// Normalized username of the channel the message lives in
    pub chat: String,
    /// Platform message id within `chat`
    pub id: i32,
    /// Media caption, if the message carries one
    pub caption: Option<String>,
}

/// Lazy, finite-or-unbounded sequence of source messages.
///
/// Not resumable: once a job consumes it the stream cannot be rewound.
pub type HistoryStream = BoxStream<'static, Result<SourceMessage, PlatformError>>;

/// Handle to a message the bot posted, used for in-place edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PostedMessage(pub i32);

/// Channel-side primitives: history, forward and copy.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChannelClient: Send + Sync {
    /// Iterate `channel`'s history in platform order, bounded by `limit` when given.
    async fn iterate_history(
        &self,
        channel: &str,
        limit: Option<usize>,
    ) -> Result<HistoryStream, PlatformError>;

    /// Forward `message` to `destination`, preserving attribution.
    async fn forward(&self, message: &SourceMessage, destination: &str)
        -> Result<(), PlatformError>;

    /// Copy `message` to `destination` with a replacement caption.
    ///
    /// Returns the id of the newly posted message.
    async fn copy(
        &self,
        message: &SourceMessage,
        destination: &str,
        caption: &str,
    ) -> Result<i32, PlatformError>;

    /// Display name of the account the client is signed in as.
    async fn self_identity(&self) -> Result<String, PlatformError>;
}

/// Reply channel bound to the chat a job was configured in.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobTransport: Send + Sync + 'static {
    /// Post a new message to the origin chat.
    async fn send_reply(&self, text: &str) -> Result<PostedMessage, PlatformError>;

    /// Replace the text of a message posted earlier.
    async fn edit_message(&self, message: PostedMessage, text: &str)
        -> Result<(), PlatformError>;
}
