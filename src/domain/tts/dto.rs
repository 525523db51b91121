use crate::infrastructure::config::EngineConfig;
use serde::{Deserialize, Serialize};

/// Request for POST /api/synthesize
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesizeRequest {
    pub engine: String,
    pub voice: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisStatus {
    Ready,
    Generating,
}

/// Response for POST /api/synthesize
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesizeResponse {
    pub audio_url: String,
    pub status: SynthesisStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Response for GET /api/cache_size
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheSizeResponse {
    pub cache_size_mb: String,
    pub size_bytes: u64,
}

/// Query for GET /api/voices
#[derive(Debug, Deserialize)]
pub struct VoicesQuery {
    pub engine: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EnginesResponse {
    pub engines: Vec<EngineConfig>,
}

/// Body for PATCH /api/engines/:engine
#[derive(Debug, Deserialize)]
pub struct EngineToggleRequest {
    pub enabled: bool,
}

/// Request for POST /v1/audio/speech
#[derive(Debug, Clone, Deserialize)]
pub struct SpeechRequest {
    #[serde(default)]
    pub model: Option<String>,
    pub input: String,
    #[serde(default = "default_speech_voice")]
    pub voice: String,
    #[serde(default = "default_response_format")]
    pub response_format: String,
    #[serde(default)]
    pub speed: Option<f32>,
}

fn default_speech_voice() -> String {
    "alloy".to_string()
}

fn default_response_format() -> String {
    "mp3".to_string()
}
