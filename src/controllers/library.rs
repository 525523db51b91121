use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::{
    domain::library::{
        AddBookRequest, BookCreatedResponse, BookUpdate, BooksResponse, CreateUserRequest,
        LibraryServiceApi, PodcastCreatedResponse, PodcastRequest, PodcastsResponse, User,
    },
    domain::tts::dto::MessageResponse,
    error::AppResult,
};

pub struct LibraryController {
    library_service: Arc<dyn LibraryServiceApi>,
}

fn message(text: &str) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.to_string(),
    })
}

impl LibraryController {
    pub fn new(library_service: Arc<dyn LibraryServiceApi>) -> Self {
        Self { library_service }
    }

    /// POST /api/users
    pub async fn create_user(
        State(controller): State<Arc<LibraryController>>,
        Json(request): Json<CreateUserRequest>,
    ) -> AppResult<(StatusCode, Json<User>)> {
        let user = controller
            .library_service
            .create_user(&request.username)
            .await?;
        Ok((StatusCode::CREATED, Json(user)))
    }

    /// GET /api/users/:username
    pub async fn get_user(
        State(controller): State<Arc<LibraryController>>,
        Path(username): Path<String>,
    ) -> AppResult<Json<User>> {
        Ok(Json(controller.library_service.get_user(&username).await?))
    }

    /// GET /api/users/:username/books
    pub async fn list_books(
        State(controller): State<Arc<LibraryController>>,
        Path(username): Path<String>,
    ) -> AppResult<Json<BooksResponse>> {
        let books = controller.library_service.list_books(&username).await?;
        Ok(Json(BooksResponse { books }))
    }

    /// POST /api/users/:username/books
    pub async fn add_book(
        State(controller): State<Arc<LibraryController>>,
        Path(username): Path<String>,
        Json(request): Json<AddBookRequest>,
    ) -> AppResult<Json<BookCreatedResponse>> {
        let book = controller
            .library_service
            .add_book(&username, request)
            .await?;
        Ok(Json(BookCreatedResponse {
            message: "Book added successfully.".to_string(),
            book_id: book.id,
        }))
    }

    /// PATCH /api/users/:username/books/:book_id
    pub async fn edit_book(
        State(controller): State<Arc<LibraryController>>,
        Path((username, book_id)): Path<(String, String)>,
        Json(update): Json<BookUpdate>,
    ) -> AppResult<Json<MessageResponse>> {
        controller
            .library_service
            .edit_book(&username, &book_id, update)
            .await?;
        Ok(message("Book updated successfully."))
    }

    /// DELETE /api/users/:username/books/:book_id
    pub async fn delete_book(
        State(controller): State<Arc<LibraryController>>,
        Path((username, book_id)): Path<(String, String)>,
    ) -> AppResult<Json<MessageResponse>> {
        controller
            .library_service
            .delete_book(&username, &book_id)
            .await?;
        Ok(message("Book deleted successfully."))
    }

    /// GET /api/users/:username/podcasts
    pub async fn list_podcasts(
        State(controller): State<Arc<LibraryController>>,
        Path(username): Path<String>,
    ) -> AppResult<Json<PodcastsResponse>> {
        let podcasts = controller.library_service.list_podcasts(&username).await?;
        Ok(Json(PodcastsResponse { podcasts }))
    }

    /// DELETE /api/users/:username/podcasts/:podcast_id
    pub async fn delete_podcast(
        State(controller): State<Arc<LibraryController>>,
        Path((username, podcast_id)): Path<(String, String)>,
    ) -> AppResult<Json<MessageResponse>> {
        controller
            .library_service
            .delete_podcast(&username, &podcast_id)
            .await?;
        Ok(message("Podcast deleted successfully."))
    }

    /// POST /api/users/:username/podcast - Start a tracked synthesis job
    pub async fn generate_podcast(
        State(controller): State<Arc<LibraryController>>,
        Path(username): Path<String>,
        Json(request): Json<PodcastRequest>,
    ) -> AppResult<Json<PodcastCreatedResponse>> {
        let response = controller
            .library_service
            .generate_podcast(&username, request)
            .await?;
        Ok(Json(response))
    }
}
