use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use serde_json::json;
use test_context::test_context;

const PAGE: &str = r#"<html><head><style>body { color: red; }</style></head><body>
    <nav><a href="/">Home</a> <a href="/archive">Archive</a></nav>
    <div id="main-content">
        <p>The harbour was quiet that morning, and the gulls circled the empty quay,
        waiting for boats that would not come back before noon.</p>
        <p>By evening the first trawler rounded the breakwater, low in the water, heavy with fish.</p>
    </div>
    <footer>Copyright</footer>
</body></html>"#;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_extract_readable_text(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/extract_text", &json!({ "html": PAGE }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let text = response.str_field("text");
    assert!(text.contains("The harbour was quiet that morning"));
    assert!(text.contains("first trawler rounded the breakwater"));
    assert!(!text.contains("Archive"));
    assert!(!text.contains("Copyright"));
    assert!(!text.contains("color: red"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_empty_text_for_markup_without_content(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/extract_text", &json!({ "html": "<script>var x = 1;</script>" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.str_field("text"), "");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_detect_language(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/detect_lang",
            &json!({ "text": "El perro corre por el parque todas las mañanas con su dueño." }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.str_field("language"), "es");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_empty_language_detection(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/detect_lang", &json!({ "text": "" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_non_http_urls(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/read_website", &json!({ "url": "ftp://example.com/file" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_read_website(ctx: &TestContext) {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/post")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(PAGE)
        .create_async()
        .await;

    let response = ctx
        .client
        .post(
            "/api/read_website",
            &json!({ "url": format!("{}/post", server.url()) }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert!(response
        .str_field("text")
        .contains("The harbour was quiet that morning"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_map_upstream_failure_to_bad_gateway(ctx: &TestContext) {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/gone")
        .with_status(500)
        .create_async()
        .await;

    let response = ctx
        .client
        .post(
            "/api/read_website",
            &json!({ "url": format!("{}/gone", server.url()) }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_GATEWAY);
}
