use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    domain::content::{
        ContentServiceApi, DetectLangRequest, ExtractTextRequest, LanguageResponse,
        ReadWebsiteRequest, TextResponse,
    },
    error::AppResult,
};

pub struct ContentController {
    content_service: Arc<dyn ContentServiceApi>,
}

impl ContentController {
    pub fn new(content_service: Arc<dyn ContentServiceApi>) -> Self {
        Self { content_service }
    }

    /// POST /api/read_website
    pub async fn read_website(
        State(controller): State<Arc<ContentController>>,
        Json(request): Json<ReadWebsiteRequest>,
    ) -> AppResult<Json<TextResponse>> {
        let text = controller.content_service.read_website(&request.url).await?;
        Ok(Json(TextResponse { text }))
    }

    /// POST /api/extract_text
    pub async fn extract_text(
        State(controller): State<Arc<ContentController>>,
        Json(request): Json<ExtractTextRequest>,
    ) -> Json<TextResponse> {
        Json(TextResponse {
            text: controller.content_service.extract_text(&request.html),
        })
    }

    /// POST /api/detect_lang
    pub async fn detect_lang(
        State(controller): State<Arc<ContentController>>,
        Json(request): Json<DetectLangRequest>,
    ) -> AppResult<Json<LanguageResponse>> {
        let language = controller.content_service.detect_language(&request.text)?;
        Ok(Json(LanguageResponse {
            language: language.to_string(),
        }))
    }
}
