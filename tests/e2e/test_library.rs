use crate::e2e::helpers;

use helpers::{fake_engine::FAILING_VOICE, TestContext};
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::time::Duration;
use test_context::test_context;

async fn create_user(ctx: &TestContext, username: &str) {
    ctx.client
        .post("/api/users", &json!({ "username": username }))
        .await
        .unwrap()
        .assert_status(StatusCode::CREATED);
}

async fn add_book(ctx: &TestContext, username: &str, title: &str) -> String {
    let response = ctx
        .client
        .post(
            &format!("/api/users/{}/books", username),
            &json!({ "title": title, "content": "Chapter one." }),
        )
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    assert_eq!(response.str_field("message"), "Book added successfully.");
    response.str_field("book_id").to_string()
}

/// Poll the podcast list until `podcast_id` leaves `generating`
async fn wait_for_podcast(ctx: &TestContext, username: &str, podcast_id: &str) -> Value {
    for _ in 0..200 {
        let response = ctx
            .client
            .get(&format!("/api/users/{}/podcasts", username))
            .await
            .unwrap();
        let podcast = response
            .array_field("podcasts")
            .iter()
            .find(|p| p["id"] == podcast_id)
            .cloned()
            .expect("podcast missing from listing");

        if podcast.get("status").and_then(|s| s.as_str()) != Some("generating") {
            return podcast;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("podcast {} never finished", podcast_id);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_create_and_fetch_user(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/users", &json!({ "username": "alice" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.str_field("username"), "alice");

    let response = ctx.client.get("/api/users/alice").await.unwrap();
    response.assert_status(StatusCode::OK);
    assert_eq!(response.str_field("username"), "alice");
    assert!(ctx.users_dir.join("alice.json").exists());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_duplicate_username(ctx: &TestContext) {
    create_user(ctx, "alice").await;

    let response = ctx
        .client
        .post("/api/users", &json!({ "username": "alice" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::CONFLICT);
    response.assert_error_message("Username already exists");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_path_like_usernames(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/users", &json!({ "username": "../etc" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_not_found_for_missing_user(ctx: &TestContext) {
    let response = ctx.client.get("/api/users/nobody").await.unwrap();
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_error_message("User not found");

    let response = ctx.client.get("/api/users/nobody/books").await.unwrap();
    response.assert_status(StatusCode::NOT_FOUND);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_manage_books(ctx: &TestContext) {
    create_user(ctx, "reader").await;
    let book_id = add_book(ctx, "reader", "Moby Dick").await;

    let response = ctx
        .client
        .patch(
            &format!("/api/users/reader/books/{}", book_id),
            &json!({ "title": "Moby-Dick; or, The Whale" }),
        )
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    assert_eq!(response.str_field("message"), "Book updated successfully.");

    let response = ctx.client.get("/api/users/reader/books").await.unwrap();
    response.assert_status(StatusCode::OK);
    let books = response.array_field("books");
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["title"], json!("Moby-Dick; or, The Whale"));
    assert_eq!(books[0]["content"], json!("Chapter one."));

    let response = ctx
        .client
        .delete(&format!("/api/users/reader/books/{}", book_id))
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    assert_eq!(response.str_field("message"), "Book deleted successfully.");

    let response = ctx
        .client
        .delete(&format!("/api/users/reader/books/{}", book_id))
        .await
        .unwrap();
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_error_message("Book not found");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_empty_book_update(ctx: &TestContext) {
    create_user(ctx, "reader").await;
    let book_id = add_book(ctx, "reader", "Dune").await;

    let response = ctx
        .client
        .patch(&format!("/api/users/reader/books/{}", book_id), &json!({}))
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_error_message("No update data provided.");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_generate_podcast_to_ready(ctx: &TestContext) {
    create_user(ctx, "host").await;

    let response = ctx
        .client
        .post(
            "/api/users/host/podcast",
            &json!({
                "title": "Episode 1",
                "text": "Welcome to the show.",
                "engine": "piper",
                "voice": "en_US-lessac-medium",
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.str_field("message"), "Podcast generation started.");
    assert_eq!(response.str_field("status"), "generating");
    let podcast_id = response.str_field("podcast_id").to_string();
    let audio_url = response.str_field("audio_url").to_string();

    let podcast = wait_for_podcast(ctx, "host", &podcast_id).await;

    assert_eq!(podcast["status"], json!("ready"));
    assert_eq!(podcast["audio_url"], json!(audio_url));
    assert_eq!(podcast["title"], json!("Episode 1"));
    assert!(ctx.static_path(&audio_url).exists());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_record_failed_podcast(ctx: &TestContext) {
    create_user(ctx, "host").await;

    let response = ctx
        .client
        .post(
            "/api/users/host/podcast",
            &json!({
                "title": "Broken",
                "text": "This will not render.",
                "engine": "piper",
                "voice": FAILING_VOICE,
            }),
        )
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    let podcast_id = response.str_field("podcast_id").to_string();

    let podcast = wait_for_podcast(ctx, "host", &podcast_id).await;

    assert_eq!(podcast["status"], json!("failed"));
    assert!(podcast["error"]
        .as_str()
        .unwrap()
        .contains("model file is corrupt"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_never_persist_podcast_credentials(ctx: &TestContext) {
    create_user(ctx, "host").await;

    let response = ctx
        .client
        .post(
            "/api/users/host/podcast",
            &json!({
                "title": "Cloud episode",
                "text": "Rendered remotely.",
                "engine": "openai",
                "voice": "nova",
                "api_key": "sk-very-secret",
            }),
        )
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    let podcast_id = response.str_field("podcast_id").to_string();
    wait_for_podcast(ctx, "host", &podcast_id).await;

    let stored = std::fs::read_to_string(ctx.users_dir.join("host.json")).unwrap();
    assert!(!stored.contains("sk-very-secret"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_invalid_podcast_requests(ctx: &TestContext) {
    create_user(ctx, "host").await;

    let response = ctx
        .client
        .post(
            "/api/users/host/podcast",
            &json!({ "title": "Empty", "text": "  ", "engine": "piper", "voice": "v" }),
        )
        .await
        .unwrap();
    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_error_message("Podcast text cannot be empty.");

    let response = ctx
        .client
        .post(
            "/api/users/host/podcast",
            &json!({ "title": "Nope", "text": "Hello", "engine": "espeak", "voice": "v" }),
        )
        .await
        .unwrap();
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = ctx
        .client
        .post(
            "/api/users/ghost/podcast",
            &json!({ "title": "Lost", "text": "Hello", "engine": "piper", "voice": "v" }),
        )
        .await
        .unwrap();
    response.assert_status(StatusCode::NOT_FOUND);

    let listing = ctx.client.get("/api/users/host/podcasts").await.unwrap();
    assert!(listing.array_field("podcasts").is_empty());
    assert_eq!(ctx.engine.calls(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_delete_podcast(ctx: &TestContext) {
    create_user(ctx, "host").await;
    let response = ctx
        .client
        .post(
            "/api/users/host/podcast",
            &json!({
                "title": "Short",
                "text": "Brief.",
                "engine": "piper",
                "voice": "en_US-lessac-medium",
            }),
        )
        .await
        .unwrap();
    let podcast_id = response.str_field("podcast_id").to_string();
    wait_for_podcast(ctx, "host", &podcast_id).await;

    let response = ctx
        .client
        .delete(&format!("/api/users/host/podcasts/{}", podcast_id))
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    assert_eq!(response.str_field("message"), "Podcast deleted successfully.");

    let response = ctx
        .client
        .delete(&format!("/api/users/host/podcasts/{}", podcast_id))
        .await
        .unwrap();
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_error_message("Podcast not found");
}
