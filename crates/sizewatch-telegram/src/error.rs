use thiserror::Error;

/// Errors returned by the Telegram Bot API client.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Bot API answered `"ok": false`.
    #[error("Telegram API error {code}: {description}")]
    Api { code: u16, description: String },

    /// The Bot API asked us to slow down (HTTP 429).
    #[error("rate limited by Telegram (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    /// Non-2xx response without a Bot API error body.
    #[error("unexpected HTTP status {status} from Telegram")]
    UnexpectedStatus { status: u16 },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid Telegram API base URL '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
