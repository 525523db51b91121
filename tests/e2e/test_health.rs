use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_ok_for_health_check(ctx: &TestContext) {
    let response = ctx.client.get("/health").await.unwrap();

    response.assert_status(StatusCode::OK);

    assert_eq!(response.text(), "OK");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_ready_status(ctx: &TestContext) {
    let response = ctx.client.get("/health/ready").await.unwrap();

    response.assert_status(StatusCode::OK);

    assert_eq!(response.str_field("status"), "ready");
    assert_eq!(response.str_field("audio_cache"), "writable");
    assert_eq!(response.str_field("users"), "writable");

    // Readiness creates the storage it reports on
    assert!(ctx.static_dir.join("audio_cache").is_dir());
    assert!(ctx.users_dir.is_dir());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_include_request_id_in_health_responses(ctx: &TestContext) {
    let response = ctx.client.get("/health").await.unwrap();
    response.assert_header_exists("x-request-id");

    let response = ctx.client.get("/health/ready").await.unwrap();
    response.assert_header_exists("x-request-id");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_echo_incoming_request_id(ctx: &TestContext) {
    let response = ctx
        .client
        .post_with_headers(
            "/api/detect_lang",
            &serde_json::json!({ "text": "The quick brown fox jumps over the lazy dog." }),
            &[("x-request-id", "trace-abc-123")],
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.header("x-request-id"),
        Some("trace-abc-123")
    );
}
