use super::model::{Book, Podcast, PodcastStatus};
use serde::{Deserialize, Serialize};

/// Request for POST /api/users
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
}

/// Request for POST /api/users/:username/books
#[derive(Debug, Serialize, Deserialize)]
pub struct AddBookRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub is_pdf: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookCreatedResponse {
    pub message: String,
    pub book_id: String,
}

/// Request for POST /api/users/:username/podcast
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodcastRequest {
    pub title: String,
    pub text: String,
    pub engine: String,
    pub voice: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PodcastCreatedResponse {
    pub message: String,
    pub podcast_id: String,
    pub status: PodcastStatus,
    pub audio_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BooksResponse {
    pub books: Vec<Book>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PodcastsResponse {
    pub podcasts: Vec<Podcast>,
}
