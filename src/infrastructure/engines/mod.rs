pub mod audio;
pub mod batching;
pub mod gemini;
pub mod models;
pub mod neural;
pub mod openai;
pub mod piper;
pub mod process;

pub use gemini::GeminiEngine;
pub use neural::{CommandPipeline, NeuralEngine, NeuralPipeline, RenderJob};
pub use openai::OpenAiEngine;
pub use piper::PiperEngine;

use crate::domain::tts::{Credentials, EngineKind, SynthesisError, SynthesisRequest, Voice};
use crate::infrastructure::config::EngineSettings;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Turns a synthesis request into one audio file.
///
/// Implementations are responsible for:
/// - Rejecting disabled or unknown engines
/// - Never leaving a partial file visible at `output`
/// - Provider-specific voice resolution
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Write the audio for `request` to `output`. On error nothing exists at
    /// `output` that was not there before.
    async fn synthesize(
        &self,
        request: &SynthesisRequest,
        output: &Path,
    ) -> Result<(), SynthesisError>;

    /// Voices offered by one engine
    async fn list_voices(
        &self,
        engine: EngineKind,
        credentials: Option<&Credentials>,
    ) -> Result<Vec<Voice>, SynthesisError>;

    /// Whether `engine` has a key to work with, from the caller or the server
    fn has_credentials(&self, engine: EngineKind, credentials: Option<&Credentials>) -> bool;
}

/// Engine adapters, one per [`EngineKind`]
pub struct EngineSet {
    pub piper: PiperEngine,
    pub kokoro: NeuralEngine,
    pub coqui: NeuralEngine,
    pub kitten: NeuralEngine,
    pub gemini: GeminiEngine,
    pub openai: OpenAiEngine,
}

pub struct EngineDispatcher {
    engines: EngineSet,
    settings: Arc<EngineSettings>,
    timeout: Duration,
    normalize: bool,
}

impl EngineDispatcher {
    pub fn new(engines: EngineSet, settings: Arc<EngineSettings>, timeout: Duration) -> Self {
        Self {
            engines,
            settings,
            timeout,
            normalize: true,
        }
    }

    pub fn with_normalization(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    async fn render(
        &self,
        request: &SynthesisRequest,
        output: &Path,
    ) -> Result<(), SynthesisError> {
        match request.engine() {
            EngineKind::Piper => self.engines.piper.render(request, output).await,
            EngineKind::Kokoro => self.engines.kokoro.render(request, output).await,
            EngineKind::Coqui => self.engines.coqui.render(request, output).await,
            EngineKind::Kitten => self.engines.kitten.render(request, output).await,
            EngineKind::Gemini => self.engines.gemini.render(request, output).await,
            EngineKind::Openai => self.engines.openai.render(request, output).await,
        }
    }

    /// Validate and normalize the staged file, then publish it at `output`
    async fn finalize(
        &self,
        request: &SynthesisRequest,
        staging: &Path,
        output: &Path,
    ) -> Result<u64, SynthesisError> {
        let size = match tokio::fs::metadata(staging).await {
            Ok(metadata) => metadata.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e.into()),
        };
        if size == 0 {
            return Err(SynthesisError::Audio(format!(
                "engine {} produced no audio",
                request.engine()
            )));
        }

        if self.normalize && request.engine().is_local() {
            let path = staging.to_path_buf();
            let outcome = tokio::task::spawn_blocking(move || audio::normalize_wav_in_place(&path))
                .await
                .map_err(|e| SynthesisError::Audio(format!("normalization task failed: {}", e)))??;
            tracing::debug!(outcome = ?outcome, "Audio normalized");
        }

        tokio::fs::rename(staging, output).await?;
        Ok(size)
    }
}

#[async_trait]
impl SpeechSynthesizer for EngineDispatcher {
    async fn synthesize(
        &self,
        request: &SynthesisRequest,
        output: &Path,
    ) -> Result<(), SynthesisError> {
        let engine = request.engine();
        if !self.settings.snapshot().await.is_enabled(engine) {
            return Err(SynthesisError::UnsupportedEngine(engine.to_string()));
        }
        if !engine.supports_format(request.format()) {
            return Err(SynthesisError::UnsupportedFormat {
                engine,
                format: request.format(),
            });
        }

        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let staging = staging_path(output);
        let start_time = Instant::now();

        let rendered = match tokio::time::timeout(self.timeout, self.render(request, &staging)).await
        {
            Ok(result) => result,
            Err(_) => Err(SynthesisError::EngineTimeout {
                engine,
                after: self.timeout,
            }),
        };

        let result = match rendered {
            Ok(()) => self.finalize(request, &staging, output).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(audio_size) => {
                tracing::info!(
                    engine = %engine,
                    voice = %request.voice(),
                    fingerprint = %request.fingerprint(),
                    text_length = request.text().len(),
                    latency_ms = start_time.elapsed().as_millis() as u64,
                    audio_size_bytes = audio_size,
                    "TTS synthesis completed"
                );
                Ok(())
            }
            Err(e) => {
                discard(&staging).await;
                tracing::warn!(
                    engine = %engine,
                    voice = %request.voice(),
                    latency_ms = start_time.elapsed().as_millis() as u64,
                    error = %e,
                    "TTS synthesis failed"
                );
                Err(e)
            }
        }
    }

    async fn list_voices(
        &self,
        engine: EngineKind,
        credentials: Option<&Credentials>,
    ) -> Result<Vec<Voice>, SynthesisError> {
        match engine {
            EngineKind::Piper => self.engines.piper.list_voices().await,
            EngineKind::Kokoro => self.engines.kokoro.list_voices().await,
            EngineKind::Coqui => self.engines.coqui.list_voices().await,
            EngineKind::Kitten => self.engines.kitten.list_voices().await,
            EngineKind::Gemini => self.engines.gemini.list_voices(credentials).await,
            EngineKind::Openai => Ok(self.engines.openai.list_voices()),
        }
    }

    fn has_credentials(&self, engine: EngineKind, credentials: Option<&Credentials>) -> bool {
        match engine {
            EngineKind::Gemini => self.engines.gemini.key(credentials).is_ok(),
            EngineKind::Openai => self.engines.openai.key(credentials).is_ok(),
            _ => true,
        }
    }
}

/// Hidden sibling of `output` that engines write into. The audio extension
/// stays last; writers pick the container from it.
pub fn staging_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match output.extension() {
        Some(ext) => format!(
            ".{}.{}.partial.{}",
            stem,
            uuid::Uuid::new_v4(),
            ext.to_string_lossy()
        ),
        None => format!(".{}.{}.partial", stem, uuid::Uuid::new_v4()),
    };
    output.with_file_name(name)
}

async fn discard(staging: &Path) {
    match tokio::fs::remove_file(staging).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %staging.display(), error = %e, "Could not remove staging file")
        }
    }
}
