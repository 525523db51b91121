use crate::domain::tts::EngineKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-user record persisted as one JSON document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub books: Vec<Book>,
    #[serde(default)]
    pub podcasts: Vec<Podcast>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub is_pdf: bool,
}

/// Partial update; absent fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_pdf: Option<bool>,
}

impl BookUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.is_pdf.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PodcastStatus {
    Generating,
    Ready,
    Failed,
}

impl fmt::Display for PodcastStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PodcastStatus::Generating => write!(f, "generating"),
            PodcastStatus::Ready => write!(f, "ready"),
            PodcastStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A job-tracked synthesis. Credentials are never stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Podcast {
    pub id: String,
    pub title: String,
    pub text: String,
    pub engine: EngineKind,
    pub voice: String,
    pub status: PodcastStatus,
    pub audio_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Result of recording a terminal state on a podcast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// The podcast already left `generating`; nothing changed
    AlreadyFinal(PodcastStatus),
    Missing,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            books: Vec::new(),
            podcasts: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn add_book(&mut self, title: String, content: String, is_pdf: bool) -> Book {
        let book = Book {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            content,
            is_pdf,
        };
        self.books.push(book.clone());
        book
    }

    pub fn edit_book(&mut self, book_id: &str, update: BookUpdate) -> Option<Book> {
        let book = self.books.iter_mut().find(|b| b.id == book_id)?;
        if let Some(title) = update.title {
            book.title = title;
        }
        if let Some(content) = update.content {
            book.content = content;
        }
        if let Some(is_pdf) = update.is_pdf {
            book.is_pdf = is_pdf;
        }
        Some(book.clone())
    }

    pub fn delete_book(&mut self, book_id: &str) -> bool {
        let before = self.books.len();
        self.books.retain(|b| b.id != book_id);
        self.books.len() != before
    }

    pub fn add_podcast(&mut self, podcast: Podcast) {
        self.podcasts.push(podcast);
    }

    pub fn delete_podcast(&mut self, podcast_id: &str) -> bool {
        let before = self.podcasts.len();
        self.podcasts.retain(|p| p.id != podcast_id);
        self.podcasts.len() != before
    }

    /// Move a `generating` podcast to `ready` or `failed`. Terminal states
    /// are never overwritten.
    pub fn finish_podcast(
        &mut self,
        podcast_id: &str,
        status: PodcastStatus,
        error: Option<String>,
    ) -> Transition {
        let Some(podcast) = self.podcasts.iter_mut().find(|p| p.id == podcast_id) else {
            return Transition::Missing;
        };
        if podcast.status != PodcastStatus::Generating {
            return Transition::AlreadyFinal(podcast.status);
        }

        podcast.status = status;
        podcast.error = error;
        Transition::Applied
    }
}

/// Usernames become file names, so only a conservative alphabet is allowed
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username.len() <= 64
        && !username.starts_with('.')
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}
