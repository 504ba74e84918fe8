//! End-to-end product checks against an in-memory page fetcher.

use std::path::PathBuf;

use serde_json::Value;
use sizewatch_core::ProductTarget;
use sizewatch_scraper::{
    check_product, DebugSink, FailureKind, FetchError, PageFetcher, StockResult,
};

/// Serves one canned page, or fails with a non-success status when `html`
/// is `None`.
struct StaticPage {
    html: Option<String>,
}

impl PageFetcher for StaticPage {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        self.html.clone().ok_or_else(|| FetchError::UnexpectedStatus {
            status: 503,
            url: url.to_owned(),
        })
    }
}

fn serving(html: &str) -> StaticPage {
    StaticPage {
        html: Some(html.to_string()),
    }
}

fn product() -> ProductTarget {
    ProductTarget {
        name: "Nike Initiator White".to_string(),
        url: "https://www.example.com/nike-initiator/p/469691390_white".to_string(),
    }
}

fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("sizewatch-e2e-{}", uuid::Uuid::new_v4()))
}

#[tokio::test]
async fn next_data_page_with_size_in_stock() {
    let html = r#"<html><head></head><body>
<script id="__NEXT_DATA__" type="application/json">
{"props":{"pageProps":{"initialState":{"product":{"variantOptions":
  [{"scDisplaySize":"9","stock":{"stockLevelStatus":"inStock"}}]}}}}}
</script></body></html>"#;

    let check = check_product(&serving(html), &product(), "9", &DebugSink::disabled()).await;

    assert_eq!(check.result, StockResult::InStock);
    assert!(check.message.contains("Nike Initiator White"));
    assert!(check.message.contains("https://www.example.com/nike-initiator/p/469691390_white"));
    assert_eq!(check.available_sizes, vec!["9".to_string()]);
}

#[tokio::test]
async fn preloaded_state_page_with_size_in_stock() {
    let html = r#"<html><body><script>
window.__PRELOADED_STATE__ = {"product":{"productDetails":{"variantOptions":
  [{"scDisplaySize":"9","stock":{"stockLevelStatus":"inStock"}}]}}};
</script></body></html>"#;

    let check = check_product(&serving(html), &product(), "9", &DebugSink::disabled()).await;
    assert_eq!(check.result, StockResult::InStock);
}

#[tokio::test]
async fn page_without_state_script_is_indeterminate_and_dumps_html() {
    let dir = scratch_dir();
    let sink = DebugSink::new(Some(dir.as_path()));
    let html = "<html><body><h1>Nike Initiator</h1></body></html>";

    let check = check_product(&serving(html), &product(), "9", &sink).await;

    assert_eq!(check.result, StockResult::Indeterminate(FailureKind::Extraction));
    assert_eq!(
        check.message,
        "⚠️ Check Failed: Could not determine stock status for Nike Initiator White."
    );
    let dumped = dir.join("debug_html_error_Nike Initiator White.html");
    assert_eq!(std::fs::read_to_string(&dumped).unwrap(), html);

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn malformed_payload_is_indeterminate_and_dumps_html() {
    let dir = scratch_dir();
    let sink = DebugSink::new(Some(dir.as_path()));
    let html = r#"<script id="__NEXT_DATA__">{"props": </script>"#;

    let check = check_product(&serving(html), &product(), "9", &sink).await;

    assert_eq!(check.result, StockResult::Indeterminate(FailureKind::Extraction));
    assert!(dir.join("debug_html_error_Nike Initiator White.html").exists());

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn blob_without_size_list_is_locator_miss_and_dumps_blob() {
    let dir = scratch_dir();
    let sink = DebugSink::new(Some(dir.as_path()));
    let html = r#"<script id="__NEXT_DATA__">{"props":{"pageProps":{"sizes":[{"label":"9"}]}}}</script>"#;

    let check = check_product(&serving(html), &product(), "9", &sink).await;

    assert_eq!(check.result, StockResult::Indeterminate(FailureKind::LocatorMiss));
    let dumped = std::fs::read_to_string(dir.join("debug_data_blob_Nike Initiator White.json"))
        .expect("blob artifact should be written");
    let blob: Value = serde_json::from_str(&dumped).unwrap();
    assert_eq!(blob["props"]["pageProps"]["sizes"][0]["label"], "9");

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn fetch_failure_is_indeterminate_without_artifacts() {
    let dir = scratch_dir();
    let sink = DebugSink::new(Some(dir.as_path()));

    let check = check_product(&StaticPage { html: None }, &product(), "9", &sink).await;

    assert_eq!(check.result, StockResult::Indeterminate(FailureKind::Fetch));
    assert!(!dir.exists(), "no artifact expected for a fetch failure");
}

#[tokio::test]
async fn located_list_without_target_size_is_out_of_stock() {
    let html = r#"<script id="__NEXT_DATA__">
{"sizes":[{"scDisplaySize":"10","stock":{"stockLevelStatus":"inStock"}}]}
</script>"#;

    let check = check_product(&serving(html), &product(), "9", &DebugSink::disabled()).await;

    assert_eq!(check.result, StockResult::OutOfStock);
    assert_eq!(check.available_sizes, vec!["10".to_string()]);
}

#[tokio::test]
async fn unwritable_artifact_dir_does_not_mask_result() {
    let dir = scratch_dir();
    std::fs::create_dir_all(&dir).unwrap();
    let blocker = dir.join("file");
    std::fs::write(&blocker, b"x").unwrap();
    let sink = DebugSink::new(Some(blocker.as_path()));

    let check = check_product(&serving("<html></html>"), &product(), "9", &sink).await;

    assert_eq!(check.result, StockResult::Indeterminate(FailureKind::Extraction));

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn empty_state_blob_is_locator_miss_and_dumps_blob() {
    let dir = scratch_dir();
    let sink = DebugSink::new(Some(dir.as_path()));
    let html = r#"<script id="__NEXT_DATA__">{}</script>"#;

    let check = check_product(&serving(html), &product(), "9", &sink).await;

    assert_eq!(check.result, StockResult::Indeterminate(FailureKind::LocatorMiss));
    let dumped = std::fs::read_to_string(dir.join("debug_data_blob_Nike Initiator White.json"))
        .expect("blob artifact should be written");
    assert_eq!(dumped.trim(), "{}");
    assert!(!dir.join("debug_html_error_Nike Initiator White.html").exists());

    std::fs::remove_dir_all(&dir).ok();
}
