use super::engine::{AudioFormat, EngineKind};
use crate::error::AppError;
use std::time::Duration;

/// Failures raised while turning a request into an audio file
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("unsupported TTS engine: {0}")]
    UnsupportedEngine(String),
    #[error("engine {engine} cannot produce {format} audio")]
    UnsupportedFormat {
        engine: EngineKind,
        format: AudioFormat,
    },
    #[error("voice '{voice}' not found for engine {engine}")]
    VoiceNotFound { engine: EngineKind, voice: String },
    #[error("engine {0} requires credentials")]
    MissingCredentials(EngineKind),
    #[error("engine {engine} process failed (exit code {code:?}): {stderr}")]
    EngineProcessFailed {
        engine: EngineKind,
        code: Option<i32>,
        stderr: String,
    },
    #[error("remote synthesis failed for {engine} (status {status:?}): {message}")]
    RemoteSynthesisFailed {
        engine: EngineKind,
        status: Option<u16>,
        message: String,
    },
    #[error("engine {engine} timed out after {after:?}")]
    EngineTimeout { engine: EngineKind, after: Duration },
    #[error("text cannot be empty")]
    EmptyText,
    #[error("audio post-processing failed: {0}")]
    Audio(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SynthesisError {
    /// True for errors caused by the request itself rather than a backend
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SynthesisError::UnsupportedEngine(_)
                | SynthesisError::UnsupportedFormat { .. }
                | SynthesisError::VoiceNotFound { .. }
                | SynthesisError::MissingCredentials(_)
                | SynthesisError::EmptyText
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TtsServiceError {
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<AppError> for TtsServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(msg) => TtsServiceError::Invalid(msg),
            AppError::NotFound(msg) => TtsServiceError::NotFound(msg),
            _ => TtsServiceError::Dependency(err.to_string()),
        }
    }
}

impl From<TtsServiceError> for AppError {
    fn from(err: TtsServiceError) -> Self {
        match err {
            TtsServiceError::Synthesis(e) if e.is_client_error() => {
                AppError::BadRequest(e.to_string())
            }
            TtsServiceError::Synthesis(e @ SynthesisError::EngineTimeout { .. }) => {
                AppError::Timeout(e.to_string())
            }
            TtsServiceError::Synthesis(e @ SynthesisError::Io(_))
            | TtsServiceError::Synthesis(e @ SynthesisError::Audio(_)) => {
                AppError::Internal(e.to_string())
            }
            TtsServiceError::Synthesis(e) => {
                AppError::ExternalService(format!("Failed to generate audio. Reason: {}", e))
            }
            TtsServiceError::Invalid(msg) => AppError::BadRequest(msg),
            TtsServiceError::NotFound(msg) => AppError::NotFound(msg),
            TtsServiceError::Dependency(msg) => AppError::Internal(msg),
            TtsServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
