//! Job status reporting over the Bot API.

use super::resilient::{edit_message_resilient, send_message_resilient};
use async_trait::async_trait;
use autoforward_core::error::PlatformError;
use autoforward_core::platform::{JobTransport, PostedMessage};
use teloxide::prelude::*;
use teloxide::types::{MessageId, ParseMode};

/// Posts a job's status messages into the chat that launched it.
pub struct TelegramJobTransport {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramJobTransport {
    /// Bind a transport to `chat_id`.
    #[must_use]
    pub const fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl JobTransport for TelegramJobTransport {
    async fn send_reply(&self, text: &str) -> Result<PostedMessage, PlatformError> {
        send_message_resilient(&self.bot, self.chat_id, text, Some(ParseMode::Html))
            .await
            .map(|msg| PostedMessage(msg.id.0))
            .map_err(|e| PlatformError::Network(e.to_string()))
    }

    async fn edit_message(&self, message: PostedMessage, text: &str) -> Result<(), PlatformError> {
        edit_message_resilient(
            &self.bot,
            self.chat_id,
            MessageId(message.0),
            text,
            Some(ParseMode::Html),
        )
        .await
        .map(|_| ())
        .map_err(|e| PlatformError::Network(e.to_string()))
    }
}
