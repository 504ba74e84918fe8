//! Integration tests for `TelegramClient` using wiremock HTTP mocks.

use sizewatch_core::Notifier;
use sizewatch_telegram::{TelegramClient, TelegramError, TelegramNotifier};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEND_PATH: &str = "/bottest-token/sendMessage";

fn test_client(base_url: &str) -> TelegramClient {
    TelegramClient::with_base_url("test-token", 30, base_url)
        .expect("client construction should not fail")
}

fn ok_body() -> serde_json::Value {
    serde_json::json!({ "ok": true, "result": { "message_id": 7 } })
}

#[tokio::test]
async fn send_message_posts_chat_text_and_disables_preview() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .and(body_json(serde_json::json!({
            "chat_id": "-100123",
            "text": "🚨 STOCK ALERT! 🚨",
            "disable_web_page_preview": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client
        .send_message("-100123", "🚨 STOCK ALERT! 🚨")
        .await
        .expect("send should succeed");
}

#[tokio::test]
async fn api_error_is_surfaced_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).with_retries(3, 0);
    let err = client.send_message("nope", "hi").await.unwrap_err();

    assert!(
        matches!(err, TelegramError::Api { code: 400, ref description } if description.contains("chat not found")),
        "expected Api(400), got: {err:?}"
    );
}

#[tokio::test]
async fn rate_limited_after_exhausting_retries() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "ok": false,
            "error_code": 429,
            "description": "Too Many Requests: retry after 0",
            "parameters": { "retry_after": 0 }
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).with_retries(1, 0);
    let err = client.send_message("1", "hi").await.unwrap_err();

    assert!(matches!(
        err,
        TelegramError::RateLimited {
            retry_after_secs: 0
        }
    ));
}

#[tokio::test]
async fn server_error_is_retried_until_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).with_retries(2, 0);
    client
        .send_message("1", "hi")
        .await
        .expect("second attempt should succeed");
}

#[tokio::test]
async fn transport_error_does_not_leak_token() {
    // Nothing listens on the discard port.
    let client = TelegramClient::with_base_url("123456:very-secret-token", 5, "http://127.0.0.1:9")
        .expect("client construction should not fail");

    let err = client.send_message("1", "hi").await.unwrap_err();
    assert!(
        !err.to_string().contains("very-secret-token"),
        "leaked token: {err}"
    );
}

#[tokio::test]
async fn notifier_swallows_delivery_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "ok": false,
            "error_code": 401,
            "description": "Unauthorized"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = TelegramNotifier::new(test_client(&server.uri()), "1");
    notifier.notify("still running").await;
}

#[tokio::test]
async fn notifier_sends_to_configured_chat() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .and(body_json(serde_json::json!({
            "chat_id": "42",
            "text": "hello",
            "disable_web_page_preview": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = TelegramNotifier::new(test_client(&server.uri()), "42");
    notifier.notify("hello").await;
}
