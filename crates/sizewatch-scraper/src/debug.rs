//! Diagnostic artifacts written when a page cannot be understood.
//!
//! Artifacts are a side channel: write failures are logged and swallowed so
//! they never replace the failure that triggered them.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/*?:"<>|]"#).expect("valid regex"));

/// Replace characters that are invalid in file names with `_`.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    UNSAFE_FILENAME_CHARS.replace_all(name, "_").into_owned()
}

/// Destination for diagnostic artifacts. A disabled sink writes nothing.
#[derive(Debug, Clone, Default)]
pub struct DebugSink {
    dir: Option<PathBuf>,
}

impl DebugSink {
    #[must_use]
    pub fn new(dir: Option<&Path>) -> Self {
        Self {
            dir: dir.map(Path::to_path_buf),
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self { dir: None }
    }

    /// Path the HTML artifact for `product_name` is written to.
    #[must_use]
    pub fn html_path(&self, product_name: &str) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| {
            dir.join(format!(
                "debug_html_error_{}.html",
                sanitize_filename(product_name)
            ))
        })
    }

    /// Path the state blob artifact for `product_name` is written to.
    #[must_use]
    pub fn blob_path(&self, product_name: &str) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| {
            dir.join(format!(
                "debug_data_blob_{}.json",
                sanitize_filename(product_name)
            ))
        })
    }

    /// Save the page that could not be parsed. Returns the written path.
    pub fn write_html(&self, product_name: &str, html: &str) -> Option<PathBuf> {
        let path = self.html_path(product_name)?;
        write_artifact(&path, html.as_bytes())
    }

    /// Save a state blob in which no size list was found. Returns the written path.
    pub fn write_blob(&self, product_name: &str, blob: &Value) -> Option<PathBuf> {
        let path = self.blob_path(product_name)?;
        let rendered = match serde_json::to_vec_pretty(blob) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(product = product_name, error = %err, "could not serialize state blob for debugging");
                return None;
            }
        };
        write_artifact(&path, &rendered)
    }
}

fn write_artifact(path: &Path, contents: &[u8]) -> Option<PathBuf> {
    let result = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or(Ok(()), std::fs::create_dir_all)
        .and_then(|()| std::fs::write(path, contents));

    match result {
        Ok(()) => {
            tracing::info!(path = %path.display(), "saved debug artifact");
            Some(path.to_path_buf())
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to write debug artifact");
            None
        }
    }
}
