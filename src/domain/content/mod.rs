pub mod dto;
pub mod error;
pub mod readability;
pub mod service;

pub use dto::{DetectLangRequest, ExtractTextRequest, LanguageResponse, ReadWebsiteRequest, TextResponse};
pub use error::ContentServiceError;
pub use readability::{extract_main_text, DocumentTree, Readability, ReadabilityWeights};
pub use service::{ContentService, ContentServiceApi};
