use super::audio::concat_wav;
use super::batching::split_into_batches;
use crate::domain::tts::{
    AudioFormat, Credentials, EngineKind, SynthesisError, SynthesisRequest, Voice,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Google Cloud TTS accepts at most 5000 bytes of input per request
const MAX_BATCH_SIZE: usize = 5000;
const DEFAULT_LANGUAGE: &str = "en-US";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeBody<'a> {
    input: TextInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig,
}

#[derive(Serialize)]
struct TextInput<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

#[derive(Deserialize)]
struct VoicesResponse {
    #[serde(default)]
    voices: Vec<RemoteVoice>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteVoice {
    name: String,
    #[serde(default)]
    language_codes: Vec<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Google Cloud Text-to-Speech over its REST API
pub struct GeminiEngine {
    client: reqwest::Client,
    endpoint: String,
    default_key: Option<Credentials>,
}

impl GeminiEngine {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        default_key: Option<Credentials>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            default_key,
        }
    }

    pub(crate) fn key<'a>(
        &'a self,
        credentials: Option<&'a Credentials>,
    ) -> Result<&'a Credentials, SynthesisError> {
        credentials
            .or(self.default_key.as_ref())
            .ok_or(SynthesisError::MissingCredentials(EngineKind::Gemini))
    }

    pub async fn render(
        &self,
        request: &SynthesisRequest,
        output: &Path,
    ) -> Result<(), SynthesisError> {
        let key = self.key(request.credentials())?;
        let language = language_code(request.voice());
        let batches = split_into_batches(request.text(), MAX_BATCH_SIZE);

        tracing::info!(
            voice = %request.voice(),
            language = %language,
            batch_count = batches.len(),
            text_length = request.text().len(),
            "Calling Google TTS API"
        );

        let mut chunks = Vec::with_capacity(batches.len());
        for (index, batch) in batches.iter().enumerate() {
            let audio = self
                .synthesize_batch(key, batch, request.voice(), language, request.format())
                .await?;
            tracing::debug!(batch_index = index, audio_size = audio.len(), "Batch synthesized");
            chunks.push(audio);
        }

        let audio = match request.format() {
            AudioFormat::Mp3 => chunks.concat(),
            AudioFormat::Wav if chunks.len() == 1 => chunks.remove(0),
            AudioFormat::Wav => concat_wav(&chunks)?,
        };

        tokio::fs::write(output, audio).await?;
        Ok(())
    }

    async fn synthesize_batch(
        &self,
        key: &Credentials,
        text: &str,
        voice: &str,
        language: &str,
        format: AudioFormat,
    ) -> Result<Vec<u8>, SynthesisError> {
        let body = SynthesizeBody {
            input: TextInput { text },
            voice: VoiceSelection {
                language_code: language,
                name: voice,
            },
            audio_config: AudioConfig {
                audio_encoding: match format {
                    AudioFormat::Mp3 => "MP3",
                    AudioFormat::Wav => "LINEAR16",
                },
            },
        };

        let response = self
            .client
            .post(format!("{}/v1/text:synthesize", self.endpoint))
            .query(&[("key", key.expose())])
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let payload: SynthesizeResponse = parse(response).await?;
        STANDARD
            .decode(payload.audio_content)
            .map_err(|e| SynthesisError::RemoteSynthesisFailed {
                engine: EngineKind::Gemini,
                status: None,
                message: format!("invalid audioContent: {}", e),
            })
    }

    pub async fn list_voices(
        &self,
        credentials: Option<&Credentials>,
    ) -> Result<Vec<Voice>, SynthesisError> {
        let key = self.key(credentials)?;

        let response = self
            .client
            .get(format!("{}/v1/voices", self.endpoint))
            .query(&[("key", key.expose())])
            .send()
            .await
            .map_err(transport_error)?;

        let payload: VoicesResponse = parse(response).await?;
        Ok(payload
            .voices
            .into_iter()
            .map(|voice| {
                let language = voice
                    .language_codes
                    .first()
                    .map(String::as_str)
                    .unwrap_or("unknown");
                Voice {
                    name: format!("Gemini: {} ({})", voice.name, language),
                    id: voice.name,
                }
            })
            .collect())
    }
}

/// `en-US-Wavenet-D` -> `en-US`
fn language_code(voice: &str) -> &str {
    let mut dashes = voice.match_indices('-').map(|(i, _)| i);
    match (dashes.next(), dashes.next()) {
        (Some(_), Some(second)) => &voice[..second],
        _ => DEFAULT_LANGUAGE,
    }
}

async fn parse<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, SynthesisError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        tracing::error!(status = status.as_u16(), message = %message, "Google TTS API call failed");
        return Err(SynthesisError::RemoteSynthesisFailed {
            engine: EngineKind::Gemini,
            status: Some(status.as_u16()),
            message,
        });
    }

    response.json::<T>().await.map_err(transport_error)
}

fn transport_error(e: reqwest::Error) -> SynthesisError {
    SynthesisError::RemoteSynthesisFailed {
        engine: EngineKind::Gemini,
        status: e.status().map(|s| s.as_u16()),
        message: e.to_string(),
    }
}
