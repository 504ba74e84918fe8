//! Per-product check: fetch, extract, locate, evaluate.

use serde_json::Value;
use sizewatch_core::ProductTarget;

use crate::debug::DebugSink;
use crate::embed::try_extract_state_blob;
use crate::error::CheckError;
use crate::fetch::PageFetcher;
use crate::locate::find_size_options;
use crate::stock::{available_sizes, evaluate_stock, StockResult};

/// Result of checking one product in one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCheck {
    pub result: StockResult,
    /// Human-readable status line, suitable for a notification.
    pub message: String,
    /// In-stock display sizes, sorted. Empty when the check was indeterminate.
    pub available_sizes: Vec<String>,
}

/// Status line for `result`. Only the in-stock line carries the URL.
#[must_use]
pub fn status_message(product: &ProductTarget, target_size: &str, result: StockResult) -> String {
    match result {
        StockResult::InStock => format!(
            "✅ IN STOCK: {} (Size {target_size})\n{}",
            product.name, product.url
        ),
        StockResult::OutOfStock => {
            format!("❌ Out of Stock: {} (Size {target_size})", product.name)
        }
        StockResult::Indeterminate(_) => format!(
            "⚠️ Check Failed: Could not determine stock status for {}.",
            product.name
        ),
    }
}

/// Checks `product` for `target_size`.
///
/// Never fails: every error below this boundary becomes
/// [`StockResult::Indeterminate`]. Extraction failures dump the page and
/// locator misses dump the parsed blob through `debug`.
pub async fn check_product<F>(
    fetcher: &F,
    product: &ProductTarget,
    target_size: &str,
    debug: &DebugSink,
) -> ProductCheck
where
    F: PageFetcher,
{
    tracing::info!(product = %product.name, size = target_size, "checking product");

    let (result, sizes) = evaluate_page(fetcher, product, target_size, debug)
        .await
        .unwrap_or_else(|err| {
            tracing::warn!(
                product = %product.name,
                url = %product.url,
                kind = %err.kind(),
                error = %err,
                "could not determine stock status"
            );
            (StockResult::Indeterminate(err.kind()), Vec::new())
        });

    match result {
        StockResult::InStock => {
            tracing::info!(product = %product.name, size = target_size, "size is in stock");
        }
        StockResult::OutOfStock => {
            tracing::info!(product = %product.name, size = target_size, "size is out of stock");
        }
        StockResult::Indeterminate(_) => {}
    }

    ProductCheck {
        result,
        message: status_message(product, target_size, result),
        available_sizes: sizes,
    }
}

async fn evaluate_page<F>(
    fetcher: &F,
    product: &ProductTarget,
    target_size: &str,
    debug: &DebugSink,
) -> Result<(StockResult, Vec<String>), CheckError>
where
    F: PageFetcher,
{
    let html = fetcher.fetch_page(&product.url).await?;
    evaluate_html(&html, &product.name, target_size, debug)
}

/// Runs extraction, location and evaluation over an already-fetched page.
///
/// # Errors
///
/// - [`CheckError::Extraction`] when no state blob can be parsed from `html`.
/// - [`CheckError::LocatorMiss`] when the blob holds no size options list.
pub fn evaluate_html(
    html: &str,
    product_name: &str,
    target_size: &str,
    debug: &DebugSink,
) -> Result<(StockResult, Vec<String>), CheckError> {
    let state = match try_extract_state_blob(html) {
        Ok(state) => state,
        Err(err) => {
            debug.write_html(product_name, html);
            return Err(err.into());
        }
    };
    tracing::debug!(product = product_name, convention = %state.convention, "parsed embedded state");

    let Some(options) = find_size_options(&state.value) else {
        debug.write_blob(product_name, &state.value);
        return Err(CheckError::LocatorMiss);
    };

    Ok(evaluate_options(options, product_name, target_size))
}

fn evaluate_options(
    options: &[Value],
    product_name: &str,
    target_size: &str,
) -> (StockResult, Vec<String>) {
    let sizes: Vec<String> = available_sizes(options).into_iter().collect();
    tracing::debug!(product = product_name, sizes = ?sizes, "sizes in stock");
    (evaluate_stock(options, target_size), sizes)
}
