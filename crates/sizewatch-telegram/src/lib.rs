//! Telegram Bot API delivery for stock alerts.

pub mod client;
pub mod error;
pub mod notifier;
pub(crate) mod retry;

pub use client::TelegramClient;
pub use error::TelegramError;
pub use notifier::TelegramNotifier;
