//! Telegram notifier.
//!
//! Delivers status and error messages to the single configured chat.

/// Low level message sending helpers
pub mod messaging;

use crate::error::BotError;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::Recipient;
use tracing::{debug, info};

/// Prefix of the [`BotError::Notify`] text when delivery to Telegram fails
pub const SEND_FAILED: &str = "Сбой при отправке сообщения в Telegram";

/// Destination for chat notifications
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `message` to the configured chat
    async fn send(&self, message: &str) -> Result<(), BotError>;
}

/// Notifier backed by the Telegram Bot API
pub struct TelegramNotifier {
    bot: Bot,
    chat: Recipient,
}

impl TelegramNotifier {
    /// Create a notifier sending through `bot` to `chat`.
    #[must_use]
    pub const fn new(bot: Bot, chat: Recipient) -> Self {
        Self { bot, chat }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, message: &str) -> Result<(), BotError> {
        info!("Sending message to Telegram");
        messaging::send_message(&self.bot, self.chat.clone(), message)
            .await
            .map_err(|e| BotError::Notify(format!("{SEND_FAILED}: {e}")))?;
        debug!(message = %message, "Message sent");
        Ok(())
    }
}
