use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_context::test_context;

fn piper_request(text: &str) -> serde_json::Value {
    json!({
        "engine": "piper",
        "voice": "en_US-lessac-medium",
        "text": text,
    })
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_generate_then_serve_from_cache(ctx: &TestContext) {
    let request = piper_request("Hello from the shelf.");

    let first = ctx.client.post("/api/synthesize", &request).await.unwrap();
    first.assert_status(StatusCode::OK);
    assert_eq!(first.str_field("status"), "generating");
    let audio_url = first.str_field("audio_url").to_string();
    assert!(audio_url.starts_with("/static/audio_cache/"));
    assert!(audio_url.ends_with(".wav"));

    ctx.wait_for_audio(&audio_url).await;

    let second = ctx.client.post("/api/synthesize", &request).await.unwrap();
    second.assert_status(StatusCode::OK);
    assert_eq!(second.str_field("status"), "ready");
    assert_eq!(second.str_field("audio_url"), audio_url);

    assert_eq!(ctx.engine.calls(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_serve_cached_audio_under_static(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/synthesize", &piper_request("Served over HTTP."))
        .await
        .unwrap();
    let audio_url = response.str_field("audio_url").to_string();
    ctx.wait_for_audio(&audio_url).await;

    let audio = ctx.client.get(&audio_url).await.unwrap();

    audio.assert_status(StatusCode::OK);
    assert_eq!(audio.body_bytes, b"audio:Served over HTTP.".to_vec());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_use_distinct_urls_for_distinct_requests(ctx: &TestContext) {
    let a = ctx
        .client
        .post("/api/synthesize", &piper_request("First sentence."))
        .await
        .unwrap();
    let b = ctx
        .client
        .post("/api/synthesize", &piper_request("Second sentence."))
        .await
        .unwrap();

    assert_ne!(a.str_field("audio_url"), b.str_field("audio_url"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_regenerate_after_clearing_cache(ctx: &TestContext) {
    let request = piper_request("Clear me.");
    let first = ctx.client.post("/api/synthesize", &request).await.unwrap();
    let audio_url = first.str_field("audio_url").to_string();
    let path = ctx.wait_for_audio(&audio_url).await;

    let cleared = ctx.client.post("/api/clear_cache", &json!({})).await.unwrap();
    cleared.assert_status(StatusCode::OK);
    assert_eq!(cleared.str_field("message"), "Cache cleared.");
    assert!(!path.exists());

    let again = ctx.client.post("/api/synthesize", &request).await.unwrap();
    assert_eq!(again.str_field("status"), "generating");
    assert_eq!(again.str_field("audio_url"), audio_url);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_cache_size(ctx: &TestContext) {
    let empty = ctx.client.get("/api/cache_size").await.unwrap();
    empty.assert_status(StatusCode::OK);
    assert_eq!(empty.str_field("cache_size_mb"), "0.00 MB");

    let response = ctx
        .client
        .post("/api/synthesize", &piper_request("Take up some space."))
        .await
        .unwrap();
    ctx.wait_for_audio(response.str_field("audio_url")).await;

    let sized = ctx.client.get("/api/cache_size").await.unwrap();
    assert_eq!(sized.u64_field("size_bytes"), "audio:Take up some space.".len() as u64);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_unknown_engine_without_touching_cache(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/synthesize",
            &json!({ "engine": "espeak", "voice": "default", "text": "Hi" }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_error_message("espeak");
    assert!(!ctx.static_dir.join("audio_cache").exists());
    assert_eq!(ctx.engine.calls(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_cloud_engine_without_api_key(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/synthesize",
            &json!({ "engine": "gemini", "voice": "en-US-Wavenet-D", "text": "Hi" }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_error_message("requires credentials");
    assert!(!ctx.static_dir.join("audio_cache").exists());
    assert_eq!(ctx.engine.calls(), 0);

    let keyed = ctx
        .client
        .post(
            "/api/synthesize",
            &json!({ "engine": "gemini", "voice": "en-US-Wavenet-D", "text": "Hi", "api_key": "g-key" }),
        )
        .await
        .unwrap();
    keyed.assert_status(StatusCode::OK);
    assert_eq!(keyed.str_field("status"), "generating");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_empty_text(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/synthesize", &piper_request("   "))
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_error_message("text cannot be empty");
    assert_eq!(ctx.engine.calls(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_format_the_engine_cannot_produce(ctx: &TestContext) {
    let mut request = piper_request("Needs mp3.");
    request["format"] = json!("mp3");

    let response = ctx.client.post("/api/synthesize", &request).await.unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_error_message("cannot produce mp3");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_voices_for_an_engine(ctx: &TestContext) {
    let response = ctx.client.get("/api/voices?engine=openai").await.unwrap();

    response.assert_status(StatusCode::OK);
    let voices = response.items();
    assert_eq!(voices.len(), 6);
    assert_eq!(
        voices[0].get("id").and_then(|v| v.as_str()),
        Some("alloy")
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_voice_listing_for_unknown_engine(ctx: &TestContext) {
    let response = ctx.client.get("/api/voices?engine=espeak").await.unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_dispatch_concurrent_identical_requests_once(ctx: &TestContext) {
    let request = piper_request("Everyone asks at once.");

    let mut futures = Vec::new();
    for _ in 0..8 {
        let client = ctx.client.clone();
        let request = request.clone();
        futures.push(async move { client.post("/api/synthesize", &request).await });
    }

    let results = futures::future::join_all(futures).await;

    let mut urls = Vec::new();
    for result in results {
        let response = result.unwrap();
        response.assert_status(StatusCode::OK);
        urls.push(response.str_field("audio_url").to_string());
    }
    urls.dedup();
    assert_eq!(urls.len(), 1);

    ctx.wait_for_audio(&urls[0]).await;
    assert_eq!(ctx.engine.calls(), 1);
}
