use sizewatch_core::Notifier;

use crate::client::TelegramClient;

/// Delivers notifications to a single Telegram chat.
///
/// Delivery failures are logged and swallowed; a lost alert never stops a
/// check cycle.
pub struct TelegramNotifier {
    client: TelegramClient,
    chat_id: String,
}

impl TelegramNotifier {
    #[must_use]
    pub fn new(client: TelegramClient, chat_id: impl Into<String>) -> Self {
        Self {
            client,
            chat_id: chat_id.into(),
        }
    }
}

impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &str) {
        match self.client.send_message(&self.chat_id, message).await {
            Ok(()) => tracing::info!(chars = message.chars().count(), "telegram message sent"),
            Err(e) => tracing::error!(error = %e, "failed to send telegram message"),
        }
    }
}
