use super::dto::{AddBookRequest, PodcastCreatedResponse, PodcastRequest};
use super::error::LibraryServiceError;
use super::model::{Book, BookUpdate, Podcast, PodcastStatus, User};
use crate::domain::tts::dto::SynthesizeRequest;
use crate::domain::tts::TtsServiceApi;
use crate::infrastructure::repositories::UserRepository;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub struct LibraryService {
    user_repo: Arc<UserRepository>,
    tts: Arc<dyn TtsServiceApi>,
}

impl LibraryService {
    pub fn new(user_repo: Arc<UserRepository>, tts: Arc<dyn TtsServiceApi>) -> Self {
        Self { user_repo, tts }
    }

    async fn find_user(&self, username: &str) -> Result<User, LibraryServiceError> {
        self.user_repo
            .find(username)
            .await?
            .ok_or(LibraryServiceError::UserNotFound)
    }
}

#[async_trait]
pub trait LibraryServiceApi: Send + Sync {
    async fn create_user(&self, username: &str) -> Result<User, LibraryServiceError>;

    async fn get_user(&self, username: &str) -> Result<User, LibraryServiceError>;

    async fn list_books(&self, username: &str) -> Result<Vec<Book>, LibraryServiceError>;

    async fn add_book(
        &self,
        username: &str,
        request: AddBookRequest,
    ) -> Result<Book, LibraryServiceError>;

    async fn edit_book(
        &self,
        username: &str,
        book_id: &str,
        update: BookUpdate,
    ) -> Result<Book, LibraryServiceError>;

    async fn delete_book(&self, username: &str, book_id: &str) -> Result<(), LibraryServiceError>;

    async fn list_podcasts(&self, username: &str) -> Result<Vec<Podcast>, LibraryServiceError>;

    async fn delete_podcast(
        &self,
        username: &str,
        podcast_id: &str,
    ) -> Result<(), LibraryServiceError>;

    /// Record a `generating` podcast and hand its synthesis to the scheduler
    async fn generate_podcast(
        &self,
        username: &str,
        request: PodcastRequest,
    ) -> Result<PodcastCreatedResponse, LibraryServiceError>;
}

#[async_trait]
impl LibraryServiceApi for LibraryService {
    async fn create_user(&self, username: &str) -> Result<User, LibraryServiceError> {
        Ok(self.user_repo.create(username).await?)
    }

    async fn get_user(&self, username: &str) -> Result<User, LibraryServiceError> {
        self.find_user(username).await
    }

    async fn list_books(&self, username: &str) -> Result<Vec<Book>, LibraryServiceError> {
        Ok(self.find_user(username).await?.books)
    }

    async fn add_book(
        &self,
        username: &str,
        request: AddBookRequest,
    ) -> Result<Book, LibraryServiceError> {
        if request.title.trim().is_empty() {
            return Err(LibraryServiceError::Invalid(
                "Book title cannot be empty.".to_string(),
            ));
        }

        let book = self
            .user_repo
            .update(username, |user| {
                user.add_book(request.title, request.content, request.is_pdf)
            })
            .await?
            .ok_or(LibraryServiceError::UserNotFound)?;

        tracing::info!(username, book_id = %book.id, "Book added");
        Ok(book)
    }

    async fn edit_book(
        &self,
        username: &str,
        book_id: &str,
        update: BookUpdate,
    ) -> Result<Book, LibraryServiceError> {
        if update.is_empty() {
            return Err(LibraryServiceError::Invalid(
                "No update data provided.".to_string(),
            ));
        }

        self.user_repo
            .update(username, |user| user.edit_book(book_id, update))
            .await?
            .ok_or(LibraryServiceError::UserNotFound)?
            .ok_or(LibraryServiceError::BookNotFound)
    }

    async fn delete_book(&self, username: &str, book_id: &str) -> Result<(), LibraryServiceError> {
        let deleted = self
            .user_repo
            .update(username, |user| user.delete_book(book_id))
            .await?
            .ok_or(LibraryServiceError::UserNotFound)?;

        if !deleted {
            return Err(LibraryServiceError::BookNotFound);
        }
        Ok(())
    }

    async fn list_podcasts(&self, username: &str) -> Result<Vec<Podcast>, LibraryServiceError> {
        Ok(self.find_user(username).await?.podcasts)
    }

    async fn delete_podcast(
        &self,
        username: &str,
        podcast_id: &str,
    ) -> Result<(), LibraryServiceError> {
        let deleted = self
            .user_repo
            .update(username, |user| user.delete_podcast(podcast_id))
            .await?
            .ok_or(LibraryServiceError::UserNotFound)?;

        if !deleted {
            return Err(LibraryServiceError::PodcastNotFound);
        }
        Ok(())
    }

    async fn generate_podcast(
        &self,
        username: &str,
        request: PodcastRequest,
    ) -> Result<PodcastCreatedResponse, LibraryServiceError> {
        if request.text.trim().is_empty() {
            return Err(LibraryServiceError::Invalid(
                "Podcast text cannot be empty.".to_string(),
            ));
        }

        let synthesis = self
            .tts
            .prepare(SynthesizeRequest {
                engine: request.engine,
                voice: request.voice.clone(),
                text: request.text.clone(),
                lang: request.lang,
                api_key: request.api_key,
                format: request.format,
            })
            .await?;
        let audio_url = self.tts.audio_url(&synthesis);

        let podcast = Podcast {
            id: Uuid::new_v4().to_string(),
            title: request.title,
            text: request.text,
            engine: synthesis.engine(),
            voice: request.voice,
            status: PodcastStatus::Generating,
            audio_url: audio_url.clone(),
            error: None,
            created_at: Utc::now(),
        };
        let podcast_id = podcast.id.clone();

        // The record must exist before the job can finish and update it
        self.user_repo
            .update(username, |user| user.add_podcast(podcast))
            .await?
            .ok_or(LibraryServiceError::UserNotFound)?;

        self.tts.start_job(username, &podcast_id, synthesis);
        tracing::info!(username, podcast_id = %podcast_id, "Podcast generation started");

        Ok(PodcastCreatedResponse {
            message: "Podcast generation started.".to_string(),
            podcast_id,
            status: PodcastStatus::Generating,
            audio_url,
        })
    }
}
