use crate::app_config::{AppConfig, FetchMode};
use crate::ConfigError;

pub const DEFAULT_RENDER_ENDPOINT: &str = "https://api.scraperapi.com";
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let optional = |var: &str| -> Option<String> { lookup(var).ok().filter(|v| !v.is_empty()) };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_flag = |var: &str, default: &str| -> Result<bool, ConfigError> {
        parse_bool(&or_default(var, default)).ok_or_else(|| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: "expected one of true/false/1/0/yes/no".to_string(),
        })
    };

    let target_size = require("SIZEWATCH_TARGET_SIZE")?.trim().to_string();

    let fetch_mode = match or_default("SIZEWATCH_FETCH_MODE", "render").as_str() {
        "render" => FetchMode::Render {
            api_key: require("SCRAPERAPI_KEY")?,
            endpoint: or_default("SIZEWATCH_RENDER_ENDPOINT", DEFAULT_RENDER_ENDPOINT),
        },
        "direct" => FetchMode::Direct,
        other => {
            return Err(ConfigError::InvalidEnvVar {
                var: "SIZEWATCH_FETCH_MODE".to_string(),
                reason: format!("unknown fetch mode '{other}'; expected 'render' or 'direct'"),
            })
        }
    };

    let products_path = PathBuf::from(or_default(
        "SIZEWATCH_PRODUCTS_PATH",
        "./config/products.yaml",
    ));
    let check_interval_secs = parse_u64("SIZEWATCH_CHECK_INTERVAL_SECS", "1800")?;
    let fetch_timeout_secs = parse_u64("SIZEWATCH_FETCH_TIMEOUT_SECS", "120")?;
    let user_agent = or_default("SIZEWATCH_USER_AGENT", DEFAULT_USER_AGENT);

    let telegram_token = optional("TELEGRAM_TOKEN");
    let telegram_chat_id = optional("TELEGRAM_CHAT_ID");
    let telegram_api_base = or_default("SIZEWATCH_TELEGRAM_API_BASE", DEFAULT_TELEGRAM_API_BASE);
    let notify_max_retries = parse_u32("SIZEWATCH_NOTIFY_MAX_RETRIES", "2")?;
    let notify_backoff_base_ms = parse_u64("SIZEWATCH_NOTIFY_BACKOFF_BASE_MS", "1000")?;

    let debug_dir = PathBuf::from(or_default("SIZEWATCH_DEBUG_DIR", "."));
    let debug_dumps = parse_flag("SIZEWATCH_DEBUG_DUMPS", "true")?;
    let notify_out_of_stock = parse_flag("SIZEWATCH_NOTIFY_OUT_OF_STOCK", "false")?;
    let announce_startup = parse_flag("SIZEWATCH_ANNOUNCE_STARTUP", "true")?;
    let log_level = or_default("SIZEWATCH_LOG_LEVEL", "info");

    Ok(AppConfig {
        target_size,
        products_path,
        check_interval_secs,
        fetch_timeout_secs,
        fetch_mode,
        user_agent,
        telegram_token,
        telegram_chat_id,
        telegram_api_base,
        notify_max_retries,
        notify_backoff_base_ms,
        debug_dir,
        debug_dumps,
        notify_out_of_stock,
        announce_startup,
        log_level,
    })
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
