//! Retry with exponential back-off and jitter for Bot API calls.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (network failures, 5xx, 429). Everything else is returned
//! immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::TelegramError;

const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:**
/// - Network-level failures: timeout, connection reset.
/// - HTTP 5xx responses, with or without a Bot API error body.
/// - [`TelegramError::RateLimited`]: the server told us when to come back.
///
/// **Not retriable:**
/// - [`TelegramError::Api`] with a 4xx code: bad token, unknown chat, etc.
/// - [`TelegramError::Deserialize`] and [`TelegramError::InvalidBaseUrl`].
pub(crate) fn is_retriable(err: &TelegramError) -> bool {
    match err {
        TelegramError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        TelegramError::RateLimited { .. } => true,
        TelegramError::Api { code, .. } | TelegramError::UnexpectedStatus { status: code } => {
            *code >= 500
        }
        TelegramError::Deserialize { .. } | TelegramError::InvalidBaseUrl { .. } => false,
    }
}

/// Delay before retry number `attempt` (1-based).
///
/// `backoff_base_ms × 2^(attempt-1)` with ±25 % jitter, never shorter than a
/// server-supplied `retry_after`, capped at 60 s.
fn backoff_delay_ms(err: &TelegramError, attempt: u32, backoff_base_ms: u64) -> u64 {
    let computed = backoff_base_ms.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (computed as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;

    let floor = match err {
        TelegramError::RateLimited { retry_after_secs } => retry_after_secs.saturating_mul(1000),
        _ => 0,
    };

    jittered.max(floor).min(MAX_DELAY_MS)
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, TelegramError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TelegramError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay_ms = backoff_delay_ms(&err, attempt, backoff_base_ms);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "Telegram transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
