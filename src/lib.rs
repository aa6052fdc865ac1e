#![deny(missing_docs)]
//! Homework status bot library.
//!
//! Polls the homework review API and forwards status changes to a Telegram chat.

/// Homework review API client.
pub mod api;
/// Telegram notifier.
pub mod bot;
/// Configuration management.
pub mod config;
/// Consecutive error notification suppression.
pub mod dedup;
/// Error taxonomy shared by every stage of a poll cycle.
pub mod error;
/// Response validation and status message formatting.
pub mod homework;
/// Log setup with secret redaction.
pub mod logging;
/// The polling driver loop.
pub mod poller;

pub use error::BotError;
