pub mod dto;
pub mod error;
pub mod model;
pub mod service;

pub use dto::{
    AddBookRequest, BookCreatedResponse, BooksResponse, CreateUserRequest,
    PodcastCreatedResponse, PodcastRequest, PodcastsResponse,
};
pub use error::LibraryServiceError;
pub use model::{
    is_valid_username, Book, BookUpdate, Podcast, PodcastStatus, Transition, User,
};
pub use service::{LibraryService, LibraryServiceApi};
