pub mod engines;

pub use engines::{EngineConfig, EngineSettings};

use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    // Storage layout
    pub static_dir: PathBuf,
    pub models_dir: PathBuf,
    pub users_dir: PathBuf,
    pub engine_config_path: PathBuf,
    // Engines
    pub piper_binary: String,
    pub kokoro_command: Option<String>,
    pub kitten_command: Option<String>,
    pub coqui_command: Option<String>,
    pub google_api_key: Option<String>,
    pub google_tts_endpoint: String,
    pub openai_api_key: Option<String>,
    pub openai_tts_model: String,
    pub engine_timeout_secs: u64,
    pub max_concurrent_syntheses: usize,
    pub normalize_audio: bool,
    // Web ingestion
    pub content_cache_enabled: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let data_dir = env::var("DATA_DIR").ok().map(PathBuf::from);
        let under_data = |name: &str| match &data_dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        };

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "production" => Environment::Production,
                    _ => Environment::Development,
                })?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
            static_dir: under_data("static"),
            models_dir: under_data("models"),
            users_dir: env::var("USERS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("users")),
            engine_config_path: env::var("ENGINE_CONFIG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("engine_config.json")),
            piper_binary: env::var("PIPER_BINARY").unwrap_or_else(|_| "piper".to_string()),
            kokoro_command: optional_var("KOKORO_COMMAND"),
            kitten_command: optional_var("KITTEN_COMMAND"),
            coqui_command: optional_var("COQUI_COMMAND"),
            google_api_key: optional_var("GOOGLE_API_KEY"),
            google_tts_endpoint: env::var("GOOGLE_TTS_ENDPOINT")
                .unwrap_or_else(|_| "https://texttospeech.googleapis.com".to_string()),
            openai_api_key: optional_var("OPENAI_API_KEY"),
            openai_tts_model: env::var("OPENAI_TTS_MODEL").unwrap_or_else(|_| "tts-1".to_string()),
            engine_timeout_secs: env::var("ENGINE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()?,
            max_concurrent_syntheses: env::var("MAX_CONCURRENT_SYNTHESES")
                .unwrap_or_else(|_| "2".to_string())
                .parse::<usize>()?
                .max(1),
            normalize_audio: flag("NORMALIZE_AUDIO", true),
            content_cache_enabled: flag("CONTENT_CACHE_ENABLED", true),
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Root of the shared audio cache
    pub fn audio_cache_dir(&self) -> PathBuf {
        self.static_dir.join("audio_cache")
    }

    pub fn engine_timeout(&self) -> Duration {
        Duration::from_secs(self.engine_timeout_secs)
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|s| matches!(s.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}
