use super::dto::{SpeechRequest, SynthesisStatus, SynthesizeRequest, SynthesizeResponse};
use super::engine::{AudioFormat, Credentials, EngineKind, SynthesisRequest};
use super::error::{SynthesisError, TtsServiceError};
use super::voices::{Voice, VoiceCatalog};
use crate::infrastructure::cache::AudioCacheStore;
use crate::infrastructure::config::{EngineConfig, EngineSettings};
use crate::infrastructure::engines::SpeechSynthesizer;
use crate::infrastructure::scheduler::{JobStore, JobTicket, SynthesisScheduler};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Engines whose voices feed the OpenAI-compatible alias table. Gemini needs
/// caller credentials to list voices, so it is reachable only by engine name.
const CATALOG_ENGINES: [EngineKind; 5] = [
    EngineKind::Piper,
    EngineKind::Kokoro,
    EngineKind::Coqui,
    EngineKind::Kitten,
    EngineKind::Openai,
];

/// A finished artifact ready to stream
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechAudio {
    pub path: PathBuf,
    pub format: AudioFormat,
}

pub struct TtsService {
    cache: Arc<AudioCacheStore>,
    scheduler: Arc<SynthesisScheduler>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    settings: Arc<EngineSettings>,
    jobs: Arc<dyn JobStore>,
}

impl TtsService {
    pub fn new(
        cache: Arc<AudioCacheStore>,
        scheduler: Arc<SynthesisScheduler>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        settings: Arc<EngineSettings>,
        jobs: Arc<dyn JobStore>,
    ) -> Self {
        Self {
            cache,
            scheduler,
            synthesizer,
            settings,
            jobs,
        }
    }
}

#[async_trait]
pub trait TtsServiceApi: Send + Sync {
    /// Validate raw input into a request for an enabled engine
    async fn prepare(&self, input: SynthesizeRequest) -> Result<SynthesisRequest, TtsServiceError>;

    /// Answer from the cache, or schedule a background synthesis.
    ///
    /// Status is `ready` iff the artifact existed before this call; otherwise
    /// it is `generating` and the artifact appears later at `audio_url`.
    async fn synthesize(
        &self,
        input: SynthesizeRequest,
    ) -> Result<SynthesizeResponse, TtsServiceError>;

    /// Destructive and global
    async fn clear_cache(&self) -> Result<(), TtsServiceError>;

    async fn cache_size(&self) -> Result<u64, TtsServiceError>;

    async fn list_voices(
        &self,
        engine: &str,
        api_key: Option<String>,
    ) -> Result<Vec<Voice>, TtsServiceError>;

    async fn engines(&self) -> Vec<EngineConfig>;

    async fn set_engine_enabled(
        &self,
        engine: &str,
        enabled: bool,
    ) -> Result<Vec<EngineConfig>, TtsServiceError>;

    /// Fresh alias snapshot built from the enabled engines
    async fn voice_catalog(&self) -> VoiceCatalog;

    /// OpenAI-compatible synthesis: resolve the alias, then synthesize
    /// in-request unless cached
    async fn speak(
        &self,
        input: SpeechRequest,
        api_key: Option<String>,
    ) -> Result<SpeechAudio, TtsServiceError>;

    /// Where the artifact for `request` is (or will be) served
    fn audio_url(&self, request: &SynthesisRequest) -> String;

    /// Schedule a job-tracked synthesis; the job record is updated once
    /// the work finishes
    fn start_job(&self, owner: &str, job_id: &str, request: SynthesisRequest);
}

#[async_trait]
impl TtsServiceApi for TtsService {
    async fn prepare(&self, input: SynthesizeRequest) -> Result<SynthesisRequest, TtsServiceError> {
        let engine: EngineKind = input.engine.parse()?;
        if !self.settings.snapshot().await.is_enabled(engine) {
            return Err(SynthesisError::UnsupportedEngine(engine.to_string()).into());
        }

        let format = match input.format.as_deref() {
            Some(raw) => raw.parse::<AudioFormat>().map_err(TtsServiceError::Invalid)?,
            None => engine.default_format(),
        };
        if !engine.supports_format(format) {
            return Err(SynthesisError::UnsupportedFormat { engine, format }.into());
        }

        let request = SynthesisRequest::new(engine, input.voice, input.text)?
            .with_language(input.lang)
            .with_format(format)
            .with_credentials(input.api_key.and_then(Credentials::new));
        if !self.synthesizer.has_credentials(engine, request.credentials()) {
            return Err(SynthesisError::MissingCredentials(engine).into());
        }
        Ok(request)
    }

    async fn synthesize(
        &self,
        input: SynthesizeRequest,
    ) -> Result<SynthesizeResponse, TtsServiceError> {
        let request = self.prepare(input).await?;
        let fingerprint = request.fingerprint();
        let format = request.format();
        let audio_url = self.cache.url_for(&fingerprint, format);

        tracing::info!(
            engine = %request.engine(),
            voice = %request.voice(),
            fingerprint = %fingerprint,
            text_length = request.text().len(),
            "TTS synthesis request"
        );

        if self.cache.lookup(&fingerprint, format).await.is_some() {
            tracing::info!(fingerprint = %fingerprint, "TTS cache hit - returning cached audio");
            return Ok(SynthesizeResponse {
                audio_url,
                status: SynthesisStatus::Ready,
            });
        }

        let output = self.cache.path_for(&fingerprint, format);
        if self.scheduler.schedule(request, output).is_none() {
            tracing::debug!(fingerprint = %fingerprint, "Joining synthesis already in flight");
        }

        Ok(SynthesizeResponse {
            audio_url,
            status: SynthesisStatus::Generating,
        })
    }

    async fn clear_cache(&self) -> Result<(), TtsServiceError> {
        self.cache.clear().await.map_err(SynthesisError::from)?;
        Ok(())
    }

    async fn cache_size(&self) -> Result<u64, TtsServiceError> {
        Ok(self.cache.size_bytes().await.map_err(SynthesisError::from)?)
    }

    async fn list_voices(
        &self,
        engine: &str,
        api_key: Option<String>,
    ) -> Result<Vec<Voice>, TtsServiceError> {
        let engine: EngineKind = engine.parse()?;
        if !self.settings.snapshot().await.is_enabled(engine) {
            return Err(SynthesisError::UnsupportedEngine(engine.to_string()).into());
        }

        let credentials = api_key.and_then(Credentials::new);
        Ok(self
            .synthesizer
            .list_voices(engine, credentials.as_ref())
            .await?)
    }

    async fn engines(&self) -> Vec<EngineConfig> {
        self.settings.snapshot().await.all()
    }

    async fn set_engine_enabled(
        &self,
        engine: &str,
        enabled: bool,
    ) -> Result<Vec<EngineConfig>, TtsServiceError> {
        let engine: EngineKind = engine.parse()?;
        let snapshot = self
            .settings
            .set_enabled(engine, enabled)
            .await
            .map_err(SynthesisError::from)?;
        Ok(snapshot.all())
    }

    async fn voice_catalog(&self) -> VoiceCatalog {
        let snapshot = self.settings.snapshot().await;
        let mut listings = Vec::new();

        for engine in CATALOG_ENGINES {
            if !snapshot.is_enabled(engine) {
                continue;
            }
            match self.synthesizer.list_voices(engine, None).await {
                Ok(voices) => listings.push((engine, voices)),
                Err(e) => {
                    tracing::warn!(engine = %engine, error = %e, "Skipping engine in voice catalog")
                }
            }
        }

        VoiceCatalog::build(listings.iter().map(|(engine, voices)| (*engine, voices.as_slice())))
    }

    async fn speak(
        &self,
        input: SpeechRequest,
        api_key: Option<String>,
    ) -> Result<SpeechAudio, TtsServiceError> {
        let catalog = self.voice_catalog().await;
        let alias = catalog
            .resolve(&input.voice.to_lowercase())
            .cloned()
            .ok_or_else(|| {
                TtsServiceError::Invalid(format!(
                    "Voice not supported. Choose from {:?}",
                    catalog.names()
                ))
            })?;

        let requested: AudioFormat = input.response_format.parse().map_err(|_| {
            TtsServiceError::Invalid(format!(
                "Format {} not supported. Use one of [\"mp3\", \"wav\"]",
                input.response_format
            ))
        })?;
        // Local engines only write wav; serve that rather than failing
        let format = if alias.engine.supports_format(requested) {
            requested
        } else {
            alias.engine.default_format()
        };

        let request = SynthesisRequest::new(alias.engine, alias.voice_id, input.input)?
            .with_format(format)
            .with_credentials(api_key.and_then(Credentials::new));
        let fingerprint = request.fingerprint();
        let path = self.cache.path_for(&fingerprint, format);

        if self.cache.lookup(&fingerprint, format).await.is_none() {
            self.scheduler.run_now(&request, &path).await?;
        }

        Ok(SpeechAudio { path, format })
    }

    fn audio_url(&self, request: &SynthesisRequest) -> String {
        self.cache.url_for(&request.fingerprint(), request.format())
    }

    fn start_job(&self, owner: &str, job_id: &str, request: SynthesisRequest) {
        let fingerprint = request.fingerprint();
        let ticket = JobTicket {
            owner: owner.to_string(),
            job_id: job_id.to_string(),
            audio_url: self.cache.url_for(&fingerprint, request.format()),
        };
        let output = self.cache.path_for(&fingerprint, request.format());
        self.scheduler
            .schedule_job(ticket, request, output, self.jobs.clone());
    }
}
