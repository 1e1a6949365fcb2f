#![deny(missing_docs)]
//! Telegram transport adapter for the auto-forward bot.

/// Telegram-specific bot/transport implementation.
pub mod bot;
/// Telegram transport configuration.
pub mod config;
/// Messaging platform client backed by the Bot API and MTProto.
pub mod platform;
/// Telegram runtime entrypoint.
pub mod runner;
/// Retry helpers for Telegram API calls.
pub mod utils;
