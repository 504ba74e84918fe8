//! HTTP client for the Telegram Bot API.
//!
//! Only `sendMessage` is used. The bot token is part of every request path,
//! so transport errors are stripped of their URL before they are surfaced.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::error::TelegramError;
use crate::retry::retry_with_backoff;

pub const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

/// Envelope shared by every Bot API response.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<u16>,
    #[serde(default)]
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    #[serde(default)]
    retry_after: Option<u64>,
}

/// Client for the Telegram Bot API.
///
/// Use [`TelegramClient::new`] for production or
/// [`TelegramClient::with_base_url`] to point at a mock server in tests.
pub struct TelegramClient {
    client: Client,
    send_message_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl TelegramClient {
    /// Creates a new client pointed at the production Bot API.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(token: &str, timeout_secs: u64) -> Result<Self, TelegramError> {
        Self::with_base_url(token, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`TelegramError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        token: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, TelegramError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("sizewatch/0.1 (stock-alerts)")
            .build()?;

        // Tokens look like `123:abc`, which `Url::join` would read as a
        // scheme, so the path is appended textually.
        let normalised = base_url.trim_end_matches('/');
        let send_message_url = Url::parse(&format!("{normalised}/bot{token}/sendMessage"))
            .map_err(|e| TelegramError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            send_message_url,
            max_retries: 0,
            backoff_base_ms: 1_000,
        })
    }

    /// Sets the retry policy for transient failures.
    #[must_use]
    pub fn with_retries(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Sends `text` to `chat_id` with link previews disabled.
    ///
    /// # Errors
    ///
    /// - [`TelegramError::RateLimited`] on HTTP 429 after all retries.
    /// - [`TelegramError::Api`] if the Bot API answers `"ok": false`.
    /// - [`TelegramError::UnexpectedStatus`] on a non-2xx without an API body.
    /// - [`TelegramError::Http`] on network failure after all retries.
    /// - [`TelegramError::Deserialize`] if a 2xx body is not a Bot API envelope.
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), TelegramError> {
        let request = SendMessageRequest {
            chat_id,
            text,
            disable_web_page_preview: true,
        };

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.post_send_message(&request)
        })
        .await
    }

    async fn post_send_message(
        &self,
        request: &SendMessageRequest<'_>,
    ) -> Result<(), TelegramError> {
        let response = self
            .client
            .post(self.send_message_url.clone())
            .json(request)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(reqwest::Error::without_url)?;

        Self::interpret_response(status, &body)
    }

    fn interpret_response(status: StatusCode, body: &str) -> Result<(), TelegramError> {
        let envelope = match serde_json::from_str::<ApiResponse>(body) {
            Ok(envelope) => envelope,
            Err(source) => {
                if status.is_success() {
                    return Err(TelegramError::Deserialize {
                        context: "sendMessage".to_owned(),
                        source,
                    });
                }
                return Err(TelegramError::UnexpectedStatus {
                    status: status.as_u16(),
                });
            }
        };

        if envelope.ok {
            return Ok(());
        }

        let code = envelope.error_code.unwrap_or(status.as_u16());
        if code == StatusCode::TOO_MANY_REQUESTS.as_u16() {
            let retry_after_secs = envelope
                .parameters
                .and_then(|p| p.retry_after)
                .unwrap_or(5);
            return Err(TelegramError::RateLimited { retry_after_secs });
        }

        Err(TelegramError::Api {
            code,
            description: envelope
                .description
                .unwrap_or_else(|| "unknown error".to_owned()),
        })
    }
}
