use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::{
    domain::tts::{
        dto::{
            CacheSizeResponse, EngineToggleRequest, EnginesResponse, MessageResponse,
            SynthesizeRequest, SynthesizeResponse, VoicesQuery,
        },
        TtsServiceApi, Voice,
    },
    error::AppResult,
};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

pub struct TtsController {
    tts_service: Arc<dyn TtsServiceApi>,
}

impl TtsController {
    pub fn new(tts_service: Arc<dyn TtsServiceApi>) -> Self {
        Self { tts_service }
    }

    /// POST /api/synthesize - Serve from cache or start a background synthesis
    pub async fn synthesize(
        State(controller): State<Arc<TtsController>>,
        Json(request): Json<SynthesizeRequest>,
    ) -> AppResult<Json<SynthesizeResponse>> {
        let response = controller.tts_service.synthesize(request).await?;
        Ok(Json(response))
    }

    /// POST /api/clear_cache
    pub async fn clear_cache(
        State(controller): State<Arc<TtsController>>,
    ) -> AppResult<Json<MessageResponse>> {
        controller.tts_service.clear_cache().await?;
        tracing::info!("Audio cache cleared");
        Ok(Json(MessageResponse {
            message: "Cache cleared.".to_string(),
        }))
    }

    /// GET /api/cache_size
    pub async fn cache_size(
        State(controller): State<Arc<TtsController>>,
    ) -> AppResult<Json<CacheSizeResponse>> {
        let size_bytes = controller.tts_service.cache_size().await?;
        Ok(Json(CacheSizeResponse {
            cache_size_mb: format!("{:.2} MB", size_bytes as f64 / BYTES_PER_MB),
            size_bytes,
        }))
    }

    /// GET /api/voices?engine=...
    pub async fn voices(
        State(controller): State<Arc<TtsController>>,
        Query(query): Query<VoicesQuery>,
    ) -> AppResult<Json<Vec<Voice>>> {
        let voices = controller
            .tts_service
            .list_voices(&query.engine, query.api_key)
            .await?;
        Ok(Json(voices))
    }

    /// GET /api/engines
    pub async fn engines(State(controller): State<Arc<TtsController>>) -> Json<EnginesResponse> {
        Json(EnginesResponse {
            engines: controller.tts_service.engines().await,
        })
    }

    /// PATCH /api/engines/:engine - Enable or disable one engine
    pub async fn set_engine_enabled(
        State(controller): State<Arc<TtsController>>,
        Path(engine): Path<String>,
        Json(request): Json<EngineToggleRequest>,
    ) -> AppResult<Json<EnginesResponse>> {
        let engines = controller
            .tts_service
            .set_engine_enabled(&engine, request.enabled)
            .await?;
        tracing::info!(engine = %engine, enabled = request.enabled, "Engine settings updated");
        Ok(Json(EnginesResponse { engines }))
    }
}
