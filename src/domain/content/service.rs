use super::error::ContentServiceError;
use super::readability::Readability;
use crate::domain::tts::{LanguageCode, LanguageGuesser};
use async_trait::async_trait;
use html2text::from_read;
use moka::future::Cache;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::USER_AGENT;
use std::sync::Arc;
use std::time::Duration;

/// Desktop browser UA; many sites serve reduced pages to unknown clients
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^\s]+").expect("valid url pattern"));
static WHITESPACE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

pub struct ContentService {
    client: reqwest::Client,
    guesser: Arc<LanguageGuesser>,
    readability: Readability,
    cache: Option<Cache<String, String>>,
}

impl ContentService {
    pub fn new(client: reqwest::Client, guesser: Arc<LanguageGuesser>, cache_enabled: bool) -> Self {
        let cache = if cache_enabled {
            Some(
                Cache::builder()
                    .max_capacity(100)
                    .time_to_idle(Duration::from_secs(30 * 60)) // 30 minutes, refreshes on access
                    .build(),
            )
        } else {
            None
        };

        Self {
            client,
            guesser,
            readability: Readability::default(),
            cache,
        }
    }

    pub fn with_readability(mut self, readability: Readability) -> Self {
        self.readability = readability;
        self
    }

    async fn fetch(&self, url: &str) -> Result<String, ContentServiceError> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
pub trait ContentServiceApi: Send + Sync {
    /// Fetch a page and reduce it to its readable text
    async fn read_website(&self, url: &str) -> Result<String, ContentServiceError>;

    /// Reader-mode text of an HTML document
    fn extract_text(&self, html: &str) -> String;

    fn detect_language(&self, text: &str) -> Result<LanguageCode, ContentServiceError>;
}

#[async_trait]
impl ContentServiceApi for ContentService {
    async fn read_website(&self, url: &str) -> Result<String, ContentServiceError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| ContentServiceError::Invalid(format!("invalid url {}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ContentServiceError::Invalid(format!(
                "unsupported url scheme: {}",
                parsed.scheme()
            )));
        }

        if let Some(cache) = &self.cache {
            if let Some(text) = cache.get(url).await {
                tracing::info!(url = %url, "Website cache hit");
                return Ok(text);
            }
        }

        let html = self.fetch(url).await?;
        let mut text = self.extract_text(&html);
        if text.is_empty() {
            tracing::info!(url = %url, "Reader mode found nothing, converting whole page");
            text = clean_text(&html);
        }

        tracing::info!(
            url = %url,
            html_length = html.len(),
            text_length = text.len(),
            "Website read"
        );

        if let Some(cache) = &self.cache {
            cache.insert(url.to_string(), text.clone()).await;
        }
        Ok(text)
    }

    fn extract_text(&self, html: &str) -> String {
        self.readability.extract(html)
    }

    fn detect_language(&self, text: &str) -> Result<LanguageCode, ContentServiceError> {
        if text.trim().is_empty() {
            return Err(ContentServiceError::Invalid("Text cannot be empty.".to_string()));
        }
        self.guesser
            .detect(text)
            .ok_or(ContentServiceError::UndetectedLanguage)
    }
}

/// Convert HTML to plain text, drop bare URLs and collapse whitespace
fn clean_text(text: &str) -> String {
    let plain_text = from_read(text.as_bytes(), usize::MAX);
    let without_urls = URL_PATTERN.replace_all(&plain_text, "");
    let normalized = WHITESPACE_PATTERN.replace_all(&without_urls, " ");
    normalized.trim().to_string()
}
