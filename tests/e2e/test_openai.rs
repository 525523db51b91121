use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_aliases_across_engines(ctx: &TestContext) {
    let response = ctx.client.get("/v1/voices").await.unwrap();

    response.assert_status(StatusCode::OK);
    let voices = response.items();
    let find = |id: &str| {
        voices
            .iter()
            .find(|v| v.get("id").and_then(|i| i.as_str()) == Some(id))
            .cloned()
    };

    let alloy = find("alloy").expect("alloy alias");
    assert_eq!(alloy["name"], json!("Openai: alloy"));
    let piper = find("piper-en_us-lessac-medium").expect("piper alias");
    assert_eq!(piper["name"], json!("Piper: en_US-lessac-medium"));
    assert!(find("kitten-expr-voice-2-f").is_some());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_audio_bytes(ctx: &TestContext) {
    let response = ctx
        .client
        .post_with_headers(
            "/v1/audio/speech",
            &json!({ "model": "tts-1", "input": "Read this aloud.", "voice": "Nova" }),
            &[("authorization", "Bearer sk-test")],
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.header("content-type"),
        Some("audio/mpeg")
    );
    assert!(response
        .header("content-disposition")
        .unwrap()
        .starts_with("attachment"));
    assert_eq!(response.body_bytes, b"audio:Read this aloud.".to_vec());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reuse_cached_speech(ctx: &TestContext) {
    let request = json!({ "input": "Say it twice.", "voice": "alloy" });

    ctx.client
        .post("/v1/audio/speech", &request)
        .await
        .unwrap()
        .assert_status(StatusCode::OK);
    ctx.client
        .post("/v1/audio/speech", &request)
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    assert_eq!(ctx.engine.calls(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_fall_back_to_engine_format(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/v1/audio/speech",
            &json!({
                "input": "Local voice.",
                "voice": "piper-en_us-lessac-medium",
                "response_format": "mp3",
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.header("content-type"),
        Some("audio/wav")
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_unknown_voice(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/v1/audio/speech",
            &json!({ "input": "Hello", "voice": "darth-vader" }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_error_message("Voice not supported");
    assert_eq!(ctx.engine.calls(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_unknown_response_format(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/v1/audio/speech",
            &json!({ "input": "Hello", "voice": "alloy", "response_format": "flac" }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_error_message("Format flac not supported");
}
