use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum ContentServiceError {
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("failed to fetch website content: {0}")]
    Fetch(String),
    #[error("could not detect language")]
    UndetectedLanguage,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<reqwest::Error> for ContentServiceError {
    fn from(err: reqwest::Error) -> Self {
        ContentServiceError::Fetch(err.to_string())
    }
}

impl From<ContentServiceError> for AppError {
    fn from(err: ContentServiceError) -> Self {
        match err {
            ContentServiceError::Invalid(msg) => AppError::BadRequest(msg),
            ContentServiceError::Fetch(msg) => {
                AppError::ExternalService(format!("Failed to fetch website content: {}", msg))
            }
            ContentServiceError::UndetectedLanguage => {
                AppError::BadRequest("Failed to detect language.".to_string())
            }
            ContentServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
