use serde::{Deserialize, Serialize};

/// Request for POST /api/read_website
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadWebsiteRequest {
    pub url: String,
}

/// Request for POST /api/extract_text
#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractTextRequest {
    pub html: String,
}

/// Request for POST /api/detect_lang
#[derive(Debug, Serialize, Deserialize)]
pub struct DetectLangRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TextResponse {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LanguageResponse {
    pub language: String,
}
