//! Page retrieval, optionally through a JavaScript rendering proxy.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Url};
use sizewatch_core::FetchMode;

use crate::embed::has_embedded_state;
use crate::error::FetchError;

/// Retrieves the HTML for a product page.
///
/// Exactly one outbound request per call; retry policy belongs to the caller.
pub trait PageFetcher {
    fn fetch_page(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// HTTP page fetcher backed by a shared `reqwest::Client`.
///
/// In [`FetchMode::Render`] every request goes to the rendering proxy with the
/// product URL as a query parameter and `render=true`; in
/// [`FetchMode::Direct`] the product URL is requested as-is with browser-like
/// headers.
pub struct RenderClient {
    client: Client,
    mode: FetchMode,
    timeout_secs: u64,
}

impl RenderClient {
    /// Creates a `RenderClient` with the given request timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`FetchError::InvalidUrl`] if the render
    /// endpoint is not a valid URL.
    pub fn new(mode: FetchMode, timeout_secs: u64, user_agent: &str) -> Result<Self, FetchError> {
        if let FetchMode::Render { endpoint, .. } = &mode {
            Url::parse(endpoint).map_err(|e| FetchError::InvalidUrl {
                url: endpoint.clone(),
                reason: e.to_string(),
            })?;
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            mode,
            timeout_secs,
        })
    }

    /// Builds the URL actually requested for `product_url`.
    fn request_url(&self, product_url: &str) -> Result<Url, FetchError> {
        match &self.mode {
            FetchMode::Render { api_key, endpoint } => {
                let mut url = Url::parse(endpoint).map_err(|e| FetchError::InvalidUrl {
                    url: endpoint.clone(),
                    reason: e.to_string(),
                })?;
                url.query_pairs_mut()
                    .append_pair("api_key", api_key)
                    .append_pair("url", product_url)
                    .append_pair("render", "true");
                Ok(url)
            }
            FetchMode::Direct => Url::parse(product_url).map_err(|e| FetchError::InvalidUrl {
                url: product_url.to_owned(),
                reason: e.to_string(),
            }),
        }
    }

    async fn get(&self, product_url: &str) -> Result<String, FetchError> {
        let url = self.request_url(product_url)?;

        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| self.transport_error(product_url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: product_url.to_owned(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(product_url, e))?;

        if body.trim().is_empty() {
            return Err(FetchError::Unusable {
                url: product_url.to_owned(),
                reason: "empty body",
            });
        }
        if !has_embedded_state(&body) && looks_like_bot_challenge(&body) {
            return Err(FetchError::Unusable {
                url: product_url.to_owned(),
                reason: "bot challenge page",
            });
        }

        Ok(body)
    }

    fn transport_error(&self, product_url: &str, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                url: product_url.to_owned(),
                timeout_secs: self.timeout_secs,
            }
        } else {
            // reqwest includes the request URL in its message; in render mode
            // that URL carries the proxy key.
            FetchError::Http(err.without_url())
        }
    }
}

impl PageFetcher for RenderClient {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!(url, mode = %self.mode, "fetching product page");
        self.get(url).await
    }
}

fn looks_like_bot_challenge(body: &str) -> bool {
    let lowered = body.to_ascii_lowercase();
    let has_cloudflare_banner = lowered.contains("attention required! | cloudflare");
    let has_just_a_moment = lowered.contains("just a moment...");
    let has_cookie_gate = lowered.contains("please enable cookies");
    let has_cf_chl = lowered.contains("cf-chl-");

    has_cloudflare_banner || (has_just_a_moment && (has_cookie_gate || has_cf_chl))
}

#[cfg(test)]
#[path = "fetch_test.rs"]
mod tests;
