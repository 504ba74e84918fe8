//! Extraction of the serialized application state embedded in a rendered page.
//!
//! Client-rendered storefronts ship their initial state inside a `<script>`
//! element. Two conventions are recognized, tried in [`CONVENTIONS`] order:
//!
//! - `next-data`: `<script id="__NEXT_DATA__">{…}</script>`, whose text is
//!   the JSON document itself.
//! - `preloaded-state`: `window.__PRELOADED_STATE__ = {…};` inside any
//!   script body, whose right-hand side is the JSON document.
//!
//! The first convention whose element is present decides the outcome; a
//! present but unparseable payload is an error, not a reason to try the next
//! convention.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::ExtractionError;

const PRELOADED_STATE_MARKER: &str = "window.__PRELOADED_STATE__";

static NEXT_DATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script\b[^>]*\bid\s*=\s*["']?__NEXT_DATA__["']?[^>]*>(.*?)</script>"#)
        .expect("valid regex")
});

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>(.*?)</script>").expect("valid regex"));

/// A known way for a framework to embed serialized state in a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbedConvention {
    NextData,
    PreloadedState,
}

/// Conventions in the order they are tried.
pub const CONVENTIONS: [EmbedConvention; 2] =
    [EmbedConvention::NextData, EmbedConvention::PreloadedState];

impl EmbedConvention {
    /// Returns the raw JSON text for this convention, or `None` if the page
    /// does not use it.
    fn locate_payload(self, html: &str) -> Option<&str> {
        match self {
            EmbedConvention::NextData => NEXT_DATA_RE
                .captures(html)
                .and_then(|cap| cap.get(1))
                .map(|m| m.as_str().trim()),
            EmbedConvention::PreloadedState => SCRIPT_RE
                .captures_iter(html)
                .filter_map(|cap| cap.get(1))
                .map(|m| m.as_str())
                .find(|body| body.contains(PRELOADED_STATE_MARKER))
                .map(assignment_rhs),
        }
    }
}

impl std::fmt::Display for EmbedConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbedConvention::NextData => write!(f, "next-data"),
            EmbedConvention::PreloadedState => write!(f, "preloaded-state"),
        }
    }
}

/// A parsed state blob together with the convention it was found under.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedState {
    pub convention: EmbedConvention,
    pub value: Value,
}

/// Isolate the right-hand side of `window.__PRELOADED_STATE__ = …;`.
///
/// Everything after the marker's `=` up to the next occurrence of the marker
/// (or the end of the script) is taken, then surrounding whitespace and
/// trailing `;` terminators are stripped.
fn assignment_rhs(script: &str) -> &str {
    let Some(start) = script.find(PRELOADED_STATE_MARKER) else {
        return "";
    };
    let rest = &script[start + PRELOADED_STATE_MARKER.len()..];
    let rest = rest.find(PRELOADED_STATE_MARKER).map_or(rest, |end| &rest[..end]);
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('=').unwrap_or(rest);
    rest.trim()
        .trim_end_matches(|c: char| c == ';' || c.is_whitespace())
}

/// Whether any known convention's state element is present in `html`.
pub(crate) fn has_embedded_state(html: &str) -> bool {
    CONVENTIONS
        .iter()
        .any(|convention| convention.locate_payload(html).is_some())
}

/// Find and parse the page's embedded state.
///
/// # Errors
///
/// - [`ExtractionError::NoEmbeddedState`] when no convention matches.
/// - [`ExtractionError::Payload`] when the first matching convention's
///   payload is not valid JSON.
pub fn try_extract_state_blob(html: &str) -> Result<EmbeddedState, ExtractionError> {
    for convention in CONVENTIONS {
        let Some(payload) = convention.locate_payload(html) else {
            continue;
        };
        tracing::debug!(%convention, bytes = payload.len(), "found embedded state script");

        let value = serde_json::from_str::<Value>(payload)
            .map_err(|source| ExtractionError::Payload { convention, source })?;
        return Ok(EmbeddedState { convention, value });
    }

    Err(ExtractionError::NoEmbeddedState)
}

/// Find and parse the page's embedded state, or `None` if that is not possible.
#[must_use]
pub fn extract_state_blob(html: &str) -> Option<Value> {
    try_extract_state_blob(html).ok().map(|state| state.value)
}
