use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use std::sync::Arc;

use crate::{
    domain::tts::{dto::SpeechRequest, TtsServiceApi, Voice},
    error::{AppError, AppResult},
};

/// OpenAI-compatible surface over the local alias table
pub struct OpenAiController {
    tts_service: Arc<dyn TtsServiceApi>,
}

impl OpenAiController {
    pub fn new(tts_service: Arc<dyn TtsServiceApi>) -> Self {
        Self { tts_service }
    }

    /// GET /v1/voices
    pub async fn voices(State(controller): State<Arc<OpenAiController>>) -> Json<Vec<Voice>> {
        let catalog = controller.tts_service.voice_catalog().await;
        let voices = catalog
            .iter()
            .map(|(alias, target)| Voice {
                id: alias.clone(),
                name: Voice::new(target.engine, target.voice_id.clone()).name,
            })
            .collect();
        Json(voices)
    }

    /// POST /v1/audio/speech - Synthesize in-request and stream the file
    pub async fn speech(
        State(controller): State<Arc<OpenAiController>>,
        headers: HeaderMap,
        Json(request): Json<SpeechRequest>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let api_key = api_key_from(&headers);
        let audio = controller.tts_service.speak(request, api_key).await?;
        let bytes = tokio::fs::read(&audio.path).await?;

        let filename = audio
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("speech")
            .to_string();

        let mut response_headers = HeaderMap::new();
        response_headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(audio.format.media_type()),
        );
        response_headers.insert(
            header::CONTENT_DISPOSITION,
            HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
                .map_err(|e| AppError::Internal(e.to_string()))?,
        );

        Ok((StatusCode::OK, response_headers, Body::from(bytes)))
    }
}

/// `api-key` header, else an `Authorization: Bearer` token
fn api_key_from(headers: &HeaderMap) -> Option<String> {
    if let Some(key) = headers.get("api-key").and_then(|v| v.to_str().ok()) {
        return Some(key.to_string());
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}
