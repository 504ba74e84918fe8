use thiserror::Error;

use crate::embed::EmbedConvention;

/// Failure to retrieve a product page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("unusable response body from {url}: {reason}")]
    Unusable { url: String, reason: &'static str },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Failure to pull an embedded state blob out of a page.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("no recognized embedded state script found")]
    NoEmbeddedState,

    #[error("{convention} payload is not valid JSON: {source}")]
    Payload {
        convention: EmbedConvention,
        #[source]
        source: serde_json::Error,
    },
}

/// Any failure that makes a single product check indeterminate.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("state blob parsed but no size options list was found")]
    LocatorMiss,
}

impl CheckError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            CheckError::Fetch(_) => FailureKind::Fetch,
            CheckError::Extraction(_) => FailureKind::Extraction,
            CheckError::LocatorMiss => FailureKind::LocatorMiss,
        }
    }
}

/// Which stage of a product check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Fetch,
    Extraction,
    LocatorMiss,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Fetch => write!(f, "fetch"),
            FailureKind::Extraction => write!(f, "extraction"),
            FailureKind::LocatorMiss => write!(f, "locator-miss"),
        }
    }
}
