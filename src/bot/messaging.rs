//! Message sending helpers for the Telegram Bot API.

use teloxide::prelude::*;
use teloxide::types::Recipient;
use teloxide::RequestError;

/// Maximum message length for Telegram with safety margin.
/// The official limit is 4096 characters.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4000;

/// Cuts `text` to at most `limit` characters, marking the cut with an ellipsis.
#[must_use]
pub fn fit_message_limit(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(limit.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}

/// Sends plain text to `chat`, truncated to the Telegram limit.
///
/// # Errors
///
/// Returns the underlying [`RequestError`] if Telegram rejects the request
/// or cannot be reached.
pub async fn send_message(bot: &Bot, chat: Recipient, text: &str) -> Result<Message, RequestError> {
    bot.send_message(chat, fit_message_limit(text, TELEGRAM_MESSAGE_LIMIT))
        .await
}
