use crate::domain::tts::TtsServiceError;
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum LibraryServiceError {
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("user not found")]
    UserNotFound,
    #[error("book not found")]
    BookNotFound,
    #[error("podcast not found")]
    PodcastNotFound,
    #[error("username already exists")]
    Conflict,
    #[error(transparent)]
    Synthesis(#[from] TtsServiceError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<AppError> for LibraryServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(msg) => LibraryServiceError::Invalid(msg),
            AppError::NotFound(_) => LibraryServiceError::UserNotFound,
            AppError::Conflict(_) => LibraryServiceError::Conflict,
            _ => LibraryServiceError::Dependency(err.to_string()),
        }
    }
}

impl From<LibraryServiceError> for AppError {
    fn from(err: LibraryServiceError) -> Self {
        match err {
            LibraryServiceError::Invalid(msg) => AppError::BadRequest(msg),
            LibraryServiceError::UserNotFound => AppError::NotFound("User not found".to_string()),
            LibraryServiceError::BookNotFound => AppError::NotFound("Book not found".to_string()),
            LibraryServiceError::PodcastNotFound => {
                AppError::NotFound("Podcast not found".to_string())
            }
            LibraryServiceError::Conflict => {
                AppError::Conflict("Username already exists".to_string())
            }
            LibraryServiceError::Synthesis(e) => e.into(),
            LibraryServiceError::Dependency(msg) => AppError::Internal(msg),
            LibraryServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
