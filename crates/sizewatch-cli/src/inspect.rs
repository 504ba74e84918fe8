//! Offline inspection of a saved product page.
//!
//! Runs extraction, location and evaluation over an HTML file (typically a
//! `debug_html_error_*.html` artifact) without touching the network.

use std::fmt::Write as _;
use std::path::Path;

use sizewatch_scraper::{
    available_sizes, evaluate_stock, find_size_options, try_extract_state_blob,
};

/// Produces the human-readable inspection report for `html`.
///
/// # Errors
///
/// Returns an error if no embedded state can be parsed from the page.
pub(crate) fn inspect_html(html: &str, size: Option<&str>) -> anyhow::Result<String> {
    let state = try_extract_state_blob(html)
        .map_err(|e| anyhow::anyhow!("no usable embedded state: {e}"))?;

    let mut report = String::new();
    writeln!(report, "convention: {}", state.convention)?;

    let Some(options) = find_size_options(&state.value) else {
        writeln!(report, "size options: not found")?;
        return Ok(report);
    };

    let sizes: Vec<String> = available_sizes(options).into_iter().collect();
    writeln!(report, "size options: {} entries", options.len())?;
    writeln!(report, "in stock: [{}]", sizes.join(", "))?;
    if let Some(size) = size {
        writeln!(report, "size {size}: {}", evaluate_stock(options, size))?;
    }
    Ok(report)
}

pub(crate) fn run_inspect(path: &Path, size: Option<&str>) -> anyhow::Result<()> {
    let html = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    print!("{}", inspect_html(&html, size)?);
    Ok(())
}
