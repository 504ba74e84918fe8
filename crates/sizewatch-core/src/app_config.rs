use std::path::PathBuf;

use crate::ConfigError;

/// How product pages are retrieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchMode {
    /// Route every request through a rendering proxy that executes the
    /// page's JavaScript before returning HTML.
    Render { api_key: String, endpoint: String },
    /// Fetch the product URL directly.
    Direct,
}

impl std::fmt::Display for FetchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchMode::Render { .. } => write!(f, "render"),
            FetchMode::Direct => write!(f, "direct"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub target_size: String,
    pub products_path: PathBuf,
    pub check_interval_secs: u64,
    pub fetch_timeout_secs: u64,
    pub fetch_mode: FetchMode,
    pub user_agent: String,
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub telegram_api_base: String,
    pub notify_max_retries: u32,
    pub notify_backoff_base_ms: u64,
    pub debug_dir: PathBuf,
    pub debug_dumps: bool,
    pub notify_out_of_stock: bool,
    pub announce_startup: bool,
    pub log_level: String,
}

impl AppConfig {
    /// Returns the Telegram bot token and chat ID.
    ///
    /// Both are optional at load time so dry runs work without them; anything
    /// that actually delivers notifications calls this before the poll loop.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] naming the first missing value.
    pub fn telegram_credentials(&self) -> Result<(&str, &str), ConfigError> {
        let token = self
            .telegram_token
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("TELEGRAM_TOKEN".to_string()))?;
        let chat_id = self
            .telegram_chat_id
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("TELEGRAM_CHAT_ID".to_string()))?;
        Ok((token, chat_id))
    }

    /// Directory for diagnostic artifacts, or `None` when dumps are disabled.
    #[must_use]
    pub fn debug_dir(&self) -> Option<&std::path::Path> {
        self.debug_dumps.then_some(self.debug_dir.as_path())
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fetch_mode = match &self.fetch_mode {
            FetchMode::Render { endpoint, .. } => format!("render ({endpoint}, key [redacted])"),
            FetchMode::Direct => "direct".to_string(),
        };
        f.debug_struct("AppConfig")
            .field("target_size", &self.target_size)
            .field("products_path", &self.products_path)
            .field("check_interval_secs", &self.check_interval_secs)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("fetch_mode", &fetch_mode)
            .field("user_agent", &self.user_agent)
            .field(
                "telegram_token",
                &self.telegram_token.as_ref().map(|_| "[redacted]"),
            )
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("telegram_api_base", &self.telegram_api_base)
            .field("notify_max_retries", &self.notify_max_retries)
            .field("notify_backoff_base_ms", &self.notify_backoff_base_ms)
            .field("debug_dir", &self.debug_dir)
            .field("debug_dumps", &self.debug_dumps)
            .field("notify_out_of_stock", &self.notify_out_of_stock)
            .field("announce_startup", &self.announce_startup)
            .field("log_level", &self.log_level)
            .finish()
    }
}
