use super::audio::concat_wav;
use super::batching::split_into_batches;
use crate::domain::tts::{
    AudioFormat, Credentials, EngineKind, SynthesisError, SynthesisRequest, Voice, OPENAI_VOICES,
};
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{CreateSpeechRequest, SpeechModel, SpeechResponseFormat, Voice as OpenAiVoice},
    Client,
};
use std::path::Path;

/// OpenAI has a limit of 4096 characters per request
const MAX_BATCH_SIZE: usize = 4096;

/// OpenAI speech endpoint. A client is built per call because the key may
/// come from the request.
pub struct OpenAiEngine {
    model: String,
    default_key: Option<Credentials>,
    api_base: Option<String>,
}

impl OpenAiEngine {
    pub fn new(model: impl Into<String>, default_key: Option<Credentials>) -> Self {
        Self {
            model: model.into(),
            default_key,
            api_base: None,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    pub fn list_voices(&self) -> Vec<Voice> {
        OPENAI_VOICES
            .iter()
            .map(|id| Voice::new(EngineKind::Openai, *id))
            .collect()
    }

    pub(crate) fn key<'a>(
        &'a self,
        credentials: Option<&'a Credentials>,
    ) -> Result<&'a Credentials, SynthesisError> {
        credentials
            .or(self.default_key.as_ref())
            .ok_or(SynthesisError::MissingCredentials(EngineKind::Openai))
    }

    pub async fn render(
        &self,
        request: &SynthesisRequest,
        output: &Path,
    ) -> Result<(), SynthesisError> {
        let voice = parse_voice(request.voice())?;
        let key = self.key(request.credentials())?;

        let client = Client::with_config(self.config(key));
        let batches = split_into_batches(request.text(), MAX_BATCH_SIZE);

        tracing::info!(
            model = %self.model,
            voice = %request.voice(),
            batch_count = batches.len(),
            text_length = request.text().len(),
            "Calling OpenAI TTS API"
        );

        let mut chunks = Vec::with_capacity(batches.len());
        for (index, batch) in batches.iter().enumerate() {
            let speech = CreateSpeechRequest {
                model: self.speech_model(),
                input: batch.clone(),
                voice: voice.clone(),
                response_format: Some(match request.format() {
                    AudioFormat::Mp3 => SpeechResponseFormat::Mp3,
                    AudioFormat::Wav => SpeechResponseFormat::Wav,
                }),
                speed: None,
            };

            let response = client.audio().speech(speech).await.map_err(|e| {
                tracing::error!(error = %e, model = %self.model, "OpenAI TTS API call failed");
                remote_error(e)
            })?;

            tracing::debug!(batch_index = index, audio_size = response.bytes.len(), "Batch synthesized");
            chunks.push(response.bytes.to_vec());
        }

        let audio = match request.format() {
            AudioFormat::Mp3 => chunks.concat(),
            AudioFormat::Wav if chunks.len() == 1 => chunks.remove(0),
            AudioFormat::Wav => concat_wav(&chunks)?,
        };

        tokio::fs::write(output, audio).await?;
        Ok(())
    }

    fn config(&self, key: &Credentials) -> OpenAIConfig {
        let config = OpenAIConfig::new().with_api_key(key.expose());
        match &self.api_base {
            Some(base) => config.with_api_base(base),
            None => config,
        }
    }

    fn speech_model(&self) -> SpeechModel {
        match self.model.as_str() {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        }
    }
}

fn parse_voice(voice: &str) -> Result<OpenAiVoice, SynthesisError> {
    match voice.to_lowercase().as_str() {
        "alloy" => Ok(OpenAiVoice::Alloy),
        "echo" => Ok(OpenAiVoice::Echo),
        "fable" => Ok(OpenAiVoice::Fable),
        "onyx" => Ok(OpenAiVoice::Onyx),
        "nova" => Ok(OpenAiVoice::Nova),
        "shimmer" => Ok(OpenAiVoice::Shimmer),
        _ => Err(SynthesisError::VoiceNotFound {
            engine: EngineKind::Openai,
            voice: voice.to_string(),
        }),
    }
}

fn remote_error(e: OpenAIError) -> SynthesisError {
    let (status, message) = match e {
        OpenAIError::ApiError(api) => (None, api.message),
        OpenAIError::Reqwest(e) => (e.status().map(|s| s.as_u16()), e.to_string()),
        other => (None, other.to_string()),
    };
    SynthesisError::RemoteSynthesisFailed {
        engine: EngineKind::Openai,
        status,
        message,
    }
}
