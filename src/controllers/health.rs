use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::infrastructure::{cache::AudioCacheStore, repositories::UserRepository};

/// Storage the service cannot run without
pub struct HealthController {
    cache: Arc<AudioCacheStore>,
    user_repo: Arc<UserRepository>,
}

impl HealthController {
    pub fn new(cache: Arc<AudioCacheStore>, user_repo: Arc<UserRepository>) -> Self {
        Self { cache, user_repo }
    }
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn health_ready(State(controller): State<Arc<HealthController>>) -> impl IntoResponse {
    let cache_ready = controller.cache.ensure_root().await.is_ok();
    let users_ready = controller.user_repo.ensure_dir().await.is_ok();

    let status = if cache_ready && users_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let state = |ready: bool| if ready { "writable" } else { "unavailable" };

    (
        status,
        Json(json!({
            "status": if status == StatusCode::OK { "ready" } else { "not_ready" },
            "audio_cache": state(cache_ready),
            "users": state(users_ready),
        })),
    )
}
