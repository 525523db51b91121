use anyhow::Result;
use http_body_util::{BodyExt, Full};
use hyper::{body::Bytes, header, Method, Request, StatusCode};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Minimal HTTP client bound to one running test server
#[derive(Clone)]
pub struct TestClient {
    base_url: String,
    client: Client<HttpConnector, Full<Bytes>>,
}

impl TestClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::builder(TokioExecutor::new()).build_http(),
        }
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.send(Method::GET, path, None, &[]).await
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<ApiResponse> {
        self.send(Method::POST, path, Some(serde_json::to_vec(body)?), &[])
            .await
    }

    pub async fn post_with_headers<T: Serialize>(
        &self,
        path: &str,
        body: &T,
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse> {
        self.send(Method::POST, path, Some(serde_json::to_vec(body)?), headers)
            .await
    }

    pub async fn patch<T: Serialize>(&self, path: &str, body: &T) -> Result<ApiResponse> {
        self.send(Method::PATCH, path, Some(serde_json::to_vec(body)?), &[])
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.send(Method::DELETE, path, None, &[]).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        json: Option<Vec<u8>>,
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse> {
        let mut builder = Request::builder()
            .method(method)
            .uri(format!("{}{}", self.base_url, path));
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = match json {
            Some(bytes) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Full::new(Bytes::from(bytes))
            }
            None => Full::new(Bytes::new()),
        };

        let response = self.client.request(builder.body(body)?).await?;
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body_bytes = response.into_body().collect().await?.to_bytes().to_vec();
        let body = serde_json::from_slice(&body_bytes).ok();

        Ok(ApiResponse {
            status,
            body,
            body_bytes,
            headers,
        })
    }
}

/// Buffered response. `body` is set when the payload parses as JSON; audio
/// and plain-text responses are only in `body_bytes`.
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Option<Value>,
    pub body_bytes: Vec<u8>,
    pub headers: HashMap<String, String>,
}

impl ApiResponse {
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {} but got {}. Body: {}",
            expected,
            self.status,
            String::from_utf8_lossy(&self.body_bytes)
        );
        self
    }

    /// Error bodies are `{"message": "..."}`
    pub fn assert_error_message(&self, expected_message: &str) -> &Self {
        let message = self.str_field("message");
        assert!(
            message.contains(expected_message),
            "Expected error message to contain '{}', but got '{}'",
            expected_message,
            message
        );
        self
    }

    pub fn assert_header_exists(&self, name: &str) -> &Self {
        assert!(self.headers.contains_key(name), "Header '{}' not found", name);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body_bytes).into_owned()
    }

    fn field(&self, name: &str) -> &Value {
        self.body
            .as_ref()
            .and_then(|b| b.get(name))
            .unwrap_or_else(|| panic!("Missing field '{}' in {}", name, self.text()))
    }

    pub fn str_field(&self, name: &str) -> &str {
        self.field(name)
            .as_str()
            .unwrap_or_else(|| panic!("Field '{}' is not a string", name))
    }

    pub fn u64_field(&self, name: &str) -> u64 {
        self.field(name)
            .as_u64()
            .unwrap_or_else(|| panic!("Field '{}' is not an integer", name))
    }

    pub fn array_field(&self, name: &str) -> &Vec<Value> {
        self.field(name)
            .as_array()
            .unwrap_or_else(|| panic!("Field '{}' is not an array", name))
    }

    /// Top-level JSON array body
    pub fn items(&self) -> &Vec<Value> {
        self.body
            .as_ref()
            .and_then(|b| b.as_array())
            .unwrap_or_else(|| panic!("Expected a JSON array, got {}", self.text()))
    }
}
