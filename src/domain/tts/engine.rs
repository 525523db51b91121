use super::error::SynthesisError;
use super::fingerprint::{fingerprint, CacheFingerprint};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of synthesis backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Piper,
    Kokoro,
    Coqui,
    Kitten,
    Gemini,
    Openai,
}

/// How an engine is invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineFamily {
    /// External command-line synthesizer fed through stdin
    Subprocess,
    /// Locally loaded model or pipeline
    LocalNeural,
    /// Remote API requiring caller credentials
    Cloud,
}

impl EngineKind {
    pub const ALL: [EngineKind; 6] = [
        EngineKind::Piper,
        EngineKind::Kokoro,
        EngineKind::Coqui,
        EngineKind::Kitten,
        EngineKind::Gemini,
        EngineKind::Openai,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Piper => "piper",
            EngineKind::Kokoro => "kokoro",
            EngineKind::Coqui => "coqui",
            EngineKind::Kitten => "kitten",
            EngineKind::Gemini => "gemini",
            EngineKind::Openai => "openai",
        }
    }

    pub fn family(&self) -> EngineFamily {
        match self {
            EngineKind::Piper => EngineFamily::Subprocess,
            EngineKind::Kokoro | EngineKind::Coqui | EngineKind::Kitten => {
                EngineFamily::LocalNeural
            }
            EngineKind::Gemini | EngineKind::Openai => EngineFamily::Cloud,
        }
    }

    pub fn is_local(&self) -> bool {
        self.family() != EngineFamily::Cloud
    }

    /// Container the engine writes when the caller does not ask for one
    pub fn default_format(&self) -> AudioFormat {
        if self.is_local() {
            AudioFormat::Wav
        } else {
            AudioFormat::Mp3
        }
    }

    pub fn supports_format(&self, format: AudioFormat) -> bool {
        match self.family() {
            EngineFamily::Cloud => true,
            _ => format == AudioFormat::Wav,
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = SynthesisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        EngineKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == needle)
            .ok_or_else(|| SynthesisError::UnsupportedEngine(s.to_string()))
    }
}

/// Audio container written to the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Wav,
    Mp3,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Mp3 => "audio/mpeg",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for AudioFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wav" => Ok(AudioFormat::Wav),
            "mp3" => Ok(AudioFormat::Mp3),
            other => Err(format!("unsupported audio format: {}", other)),
        }
    }
}

/// Opaque credential material for cloud engines. Never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials(String);

impl Credentials {
    /// Blank material is treated as absent
    pub fn new(material: impl Into<String>) -> Option<Self> {
        let material = material.into();
        if material.trim().is_empty() {
            None
        } else {
            Some(Self(material.trim().to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credentials(***)")
    }
}

/// A validated, immutable synthesis request
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    engine: EngineKind,
    voice: String,
    text: String,
    language: Option<String>,
    format: AudioFormat,
    credentials: Option<Credentials>,
}

impl SynthesisRequest {
    pub fn new(
        engine: EngineKind,
        voice: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<Self, SynthesisError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(SynthesisError::EmptyText);
        }

        Ok(Self {
            engine,
            voice: voice.into(),
            text,
            language: None,
            format: engine.default_format(),
            credentials: None,
        })
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language.filter(|l| {
            let l = l.trim();
            !l.is_empty() && !l.eq_ignore_ascii_case("auto")
        });
        self
    }

    pub fn with_format(mut self, format: AudioFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn engine(&self) -> EngineKind {
        self.engine
    }

    pub fn voice(&self) -> &str {
        &self.voice
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Cache identity of this request. Credentials and language hints do not
    /// participate.
    pub fn fingerprint(&self) -> CacheFingerprint {
        fingerprint(&self.text, &self.voice, self.engine, Some(self.format))
    }
}
