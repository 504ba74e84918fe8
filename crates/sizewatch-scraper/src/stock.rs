//! Stock evaluation over a located size options list.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::error::FailureKind;
use crate::locate::DISPLAY_SIZE_KEY;

/// Stock status value that marks a size as purchasable.
pub const IN_STOCK_STATUS: &str = "inStock";

const STOCK_KEY: &str = "stock";
const STOCK_STATUS_KEY: &str = "stockLevelStatus";

/// Outcome of a single product check.
///
/// `Indeterminate` means the check could not be completed and must never be
/// reported as out of stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StockResult {
    InStock,
    OutOfStock,
    Indeterminate(FailureKind),
}

impl StockResult {
    #[must_use]
    pub fn is_in_stock(self) -> bool {
        matches!(self, StockResult::InStock)
    }

    #[must_use]
    pub fn is_indeterminate(self) -> bool {
        matches!(self, StockResult::Indeterminate(_))
    }
}

impl std::fmt::Display for StockResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockResult::InStock => write!(f, "in stock"),
            StockResult::OutOfStock => write!(f, "out of stock"),
            StockResult::Indeterminate(kind) => write!(f, "indeterminate ({kind})"),
        }
    }
}

fn display_size(record: &Value) -> Option<&str> {
    record.get(DISPLAY_SIZE_KEY).and_then(Value::as_str)
}

fn is_purchasable(record: &Value) -> bool {
    record
        .get(STOCK_KEY)
        .and_then(|stock| stock.get(STOCK_STATUS_KEY))
        .and_then(Value::as_str)
        == Some(IN_STOCK_STATUS)
}

/// Returns `InStock` if any record has display size `target_size` and an
/// in-stock status, otherwise `OutOfStock`. An empty list is `OutOfStock`.
#[must_use]
pub fn evaluate_stock(options: &[Value], target_size: &str) -> StockResult {
    let available = options
        .iter()
        .any(|record| display_size(record) == Some(target_size) && is_purchasable(record));

    if available {
        StockResult::InStock
    } else {
        StockResult::OutOfStock
    }
}

/// Sorted set of display sizes currently in stock.
#[must_use]
pub fn available_sizes(options: &[Value]) -> BTreeSet<String> {
    options
        .iter()
        .filter(|record| is_purchasable(record))
        .filter_map(display_size)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(size: &str, status: &str) -> Value {
        json!({"scDisplaySize": size, "stock": {"stockLevelStatus": status}})
    }

    #[test]
    fn matching_size_in_stock() {
        let options = [record("9", "inStock")];
        assert_eq!(evaluate_stock(&options, "9"), StockResult::InStock);
    }

    #[test]
    fn matching_size_out_of_stock() {
        let options = [record("9", "outOfStock")];
        assert_eq!(evaluate_stock(&options, "9"), StockResult::OutOfStock);
    }

    #[test]
    fn no_record_for_target_size() {
        let options = [record("9", "inStock")];
        assert_eq!(evaluate_stock(&options, "10"), StockResult::OutOfStock);
    }

    #[test]
    fn empty_list_is_out_of_stock_not_indeterminate() {
        assert_eq!(evaluate_stock(&[], "9"), StockResult::OutOfStock);
    }

    #[test]
    fn size_comparison_is_exact() {
        let options = [record("9 ", "inStock"), record("UK 9", "inStock")];
        assert_eq!(evaluate_stock(&options, "9"), StockResult::OutOfStock);
    }

    #[test]
    fn status_comparison_is_exact() {
        let options = [record("9", "INSTOCK"), record("9", "lowStock")];
        assert_eq!(evaluate_stock(&options, "9"), StockResult::OutOfStock);
    }

    #[test]
    fn records_missing_stock_field_are_not_purchasable() {
        let options = [json!({"scDisplaySize": "9"}), json!({"scDisplaySize": "9", "stock": null})];
        assert_eq!(evaluate_stock(&options, "9"), StockResult::OutOfStock);
    }

    #[test]
    fn numeric_display_size_does_not_match_string_target() {
        let options = [json!({"scDisplaySize": 9, "stock": {"stockLevelStatus": "inStock"}})];
        assert_eq!(evaluate_stock(&options, "9"), StockResult::OutOfStock);
    }

    #[test]
    fn any_matching_record_is_enough() {
        let options = [
            record("9", "outOfStock"),
            record("10", "inStock"),
            record("9", "inStock"),
        ];
        assert_eq!(evaluate_stock(&options, "9"), StockResult::InStock);
    }

    #[test]
    fn available_sizes_are_sorted_and_deduplicated() {
        let options = [
            record("9", "inStock"),
            record("10", "outOfStock"),
            record("11", "inStock"),
            record("9", "inStock"),
            json!("not a record"),
        ];
        let sizes: Vec<String> = available_sizes(&options).into_iter().collect();
        assert_eq!(sizes, vec!["11".to_string(), "9".to_string()]);
    }

    #[test]
    fn display_distinguishes_indeterminate() {
        assert_eq!(StockResult::OutOfStock.to_string(), "out of stock");
        assert_eq!(
            StockResult::Indeterminate(FailureKind::Fetch).to_string(),
            "indeterminate (fetch)"
        );
        assert!(StockResult::Indeterminate(FailureKind::LocatorMiss).is_indeterminate());
        assert!(!StockResult::OutOfStock.is_indeterminate());
    }
}
