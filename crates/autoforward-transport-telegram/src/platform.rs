//! [`ChannelClient`] implementation for Telegram.
//!
//! The Bot API cannot read a channel's history, so history is walked over an
//! MTProto session signed in with the same bot token. Forwarding, copying and
//! identity lookups go through the Bot API.

use crate::config::TelegramSettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use autoforward_core::error::PlatformError;
use autoforward_core::platform::{ChannelClient, HistoryStream, SourceMessage};
use futures_util::StreamExt;
use grammers_client::types::Message as HistoryMessage;
use grammers_client::{Client, Config, InitParams};
use grammers_session::Session;
use teloxide::prelude::*;
use teloxide::types::{MessageId, Recipient};
use teloxide::{ApiError, RequestError};
use tracing::{debug, info};

/// Telegram-backed platform client.
pub struct TelegramPlatform {
    bot: Bot,
    history: Client,
}

impl TelegramPlatform {
    /// Open the MTProto session used for history reads and sign it in as the bot.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or the bot sign-in fails.
    pub async fn connect(bot: Bot, settings: &TelegramSettings) -> Result<Self> {
        let history = Client::connect(Config {
            session: Session::new(),
            api_id: settings.api_id,
            api_hash: settings.api_hash.clone(),
            params: InitParams::default(),
        })
        .await
        .context("Failed to connect to Telegram MTProto")?;

        if !history
            .is_authorized()
            .await
            .context("Failed to check MTProto authorization")?
        {
            history
                .bot_sign_in(&settings.bot_token)
                .await
                .context("MTProto bot sign-in failed")?;
        }
        info!("MTProto history session ready");

        Ok(Self { bot, history })
    }
}

/// Map a destination as typed by the user to a Bot API chat reference.
///
/// Numeric ids are used as-is; anything else is treated as a public
/// username and gets a leading `@` if it lacks one. Public links are reduced
/// to their last path segment.
#[must_use]
pub fn destination_recipient(destination: &str) -> Recipient {
    let trimmed = destination.trim();
    if let Ok(id) = trimmed.parse::<i64>() {
        return Recipient::Id(ChatId(id));
    }
    let username = autoforward_core::channel::normalize_source(trimmed);
    Recipient::ChannelUsername(format!("@{username}"))
}

/// History is resolved by username; a bare numeric id carries no access hash.
fn numeric_source_rejected(channel: &str) -> Result<(), PlatformError> {
    if channel.parse::<i64>().is_ok() {
        return Err(PlatformError::NotFound(format!(
            "{channel}: source must be a public @username or t.me link"
        )));
    }
    Ok(())
}

fn request_error(e: RequestError) -> PlatformError {
    match e {
        RequestError::Api(ApiError::ChatNotFound) => PlatformError::NotFound(e.to_string()),
        RequestError::Api(api) => PlatformError::Api(api.to_string()),
        RequestError::Network(net) => PlatformError::Network(net.to_string()),
        RequestError::RetryAfter(after) => {
            PlatformError::Api(format!("flood wait: retry after {}s", after.seconds()))
        }
        other => PlatformError::Unknown(other.to_string()),
    }
}

fn history_error(e: impl std::fmt::Display) -> PlatformError {
    PlatformError::Network(e.to_string())
}

fn source_message(chat: &str, message: &HistoryMessage) -> SourceMessage {
    let caption = message
        .media()
        .is_some()
        .then(|| message.text().to_string())
        .filter(|text| !text.is_empty());
    SourceMessage {
        chat: chat.to_string(),
        id: message.id(),
        caption,
    }
}

#[async_trait]
impl ChannelClient for TelegramPlatform {
    async fn iterate_history(
        &self,
        channel: &str,
        limit: Option<usize>,
    ) -> Result<HistoryStream, PlatformError> {
        numeric_source_rejected(channel)?;
        let chat = self
            .history
            .resolve_username(channel)
            .await
            .map_err(history_error)?
            .ok_or_else(|| PlatformError::NotFound(format!("@{channel}")))?;
        debug!(channel, chat_id = chat.id(), "Resolved source channel");

        let mut iter = self.history.iter_messages(chat.pack());
        if let Some(limit) = limit {
            iter = iter.limit(limit);
        }

        let channel = channel.to_string();
        let stream = futures_util::stream::unfold(Some(iter), move |state| {
            let channel = channel.clone();
            async move {
                let mut iter = state?;
                match iter.next().await {
                    Ok(Some(message)) => Some((Ok(source_message(&channel, &message)), Some(iter))),
                    Ok(None) => None,
                    Err(e) => Some((Err(history_error(e)), None)),
                }
            }
        });
        Ok(stream.boxed())
    }

    async fn forward(
        &self,
        message: &SourceMessage,
        destination: &str,
    ) -> Result<(), PlatformError> {
        self.bot
            .forward_message(
                destination_recipient(destination),
                destination_recipient(&message.chat),
                MessageId(message.id),
            )
            .await
            .map(|_| ())
            .map_err(request_error)
    }

    async fn copy(
        &self,
        message: &SourceMessage,
        destination: &str,
        caption: &str,
    ) -> Result<i32, PlatformError> {
        self.bot
            .copy_message(
                destination_recipient(destination),
                destination_recipient(&message.chat),
                MessageId(message.id),
            )
            .caption(caption.to_string())
            .await
            .map(|id| id.0)
            .map_err(request_error)
    }

    async fn self_identity(&self) -> Result<String, PlatformError> {
        let me = self.bot.get_me().await.map_err(request_error)?;
        Ok(me
            .user
            .username
            .as_ref()
            .map_or_else(|| me.user.first_name.clone(), |name| format!("@{name}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_destination_is_a_chat_id() {
        assert_eq!(
            destination_recipient("-1001234567890"),
            Recipient::Id(ChatId(-1_001_234_567_890))
        );
    }

    #[test]
    fn username_destination_gets_a_sigil() {
        assert_eq!(
            destination_recipient("mychannel"),
            Recipient::ChannelUsername("@mychannel".to_string())
        );
        assert_eq!(
            destination_recipient("@mychannel"),
            Recipient::ChannelUsername("@mychannel".to_string())
        );
    }

    #[test]
    fn link_destination_is_reduced_to_username() {
        assert_eq!(
            destination_recipient("https://t.me/mychannel"),
            Recipient::ChannelUsername("@mychannel".to_string())
        );
    }

    #[test]
    fn numeric_source_is_rejected_before_lookup() {
        assert!(matches!(
            numeric_source_rejected("-1001234567890"),
            Err(PlatformError::NotFound(reason)) if reason.contains("@username")
        ));
        assert_eq!(numeric_source_rejected("news"), Ok(()));
    }

    #[test]
    fn api_errors_keep_their_category() {
        assert!(matches!(
            request_error(RequestError::Api(ApiError::ChatNotFound)),
            PlatformError::NotFound(_)
        ));
        assert!(matches!(
            request_error(RequestError::Api(ApiError::MessageToForwardNotFound)),
            PlatformError::Api(_)
        ));
    }
}
