pub mod app_config;
pub mod config;
pub mod notify;
pub mod products;

pub use app_config::{AppConfig, FetchMode};
pub use config::{load_app_config, load_app_config_from_env};
pub use notify::{Notifier, StdoutNotifier};
pub use products::{load_products, ProductTarget, ProductsFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read products file {path}: {source}")]
    ProductsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse products file: {0}")]
    ProductsFileParse(#[source] serde_yaml::Error),

    #[error("products file validation failed: {0}")]
    Validation(String),
}
