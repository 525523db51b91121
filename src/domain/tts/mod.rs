pub mod dto;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod language;
pub mod service;
pub mod voices;

pub use engine::{AudioFormat, Credentials, EngineFamily, EngineKind, SynthesisRequest};
pub use error::{SynthesisError, TtsServiceError};
pub use fingerprint::{fingerprint, CacheFingerprint};
pub use language::{LanguageCode, LanguageGuesser};
pub use service::{SpeechAudio, TtsService, TtsServiceApi};
pub use voices::{Voice, VoiceAlias, VoiceCatalog, KITTEN_VOICES, OPENAI_VOICES};
