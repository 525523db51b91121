use super::engine::{AudioFormat, EngineKind};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// ASCII unit separator; never produced by a voice id or engine name.
const FIELD_SEPARATOR: char = '\u{1f}';

/// Hex-encoded SHA-256 digest identifying one cacheable synthesis
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheFingerprint(String);

impl CacheFingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the cache key for `(text, voice, engine[, format])`
pub fn fingerprint(
    text: &str,
    voice: &str,
    engine: EngineKind,
    format: Option<AudioFormat>,
) -> CacheFingerprint {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.update(FIELD_SEPARATOR.to_string().as_bytes());
    hasher.update(voice.as_bytes());
    hasher.update(FIELD_SEPARATOR.to_string().as_bytes());
    hasher.update(engine.as_str().as_bytes());
    if let Some(format) = format {
        hasher.update(FIELD_SEPARATOR.to_string().as_bytes());
        hasher.update(format.extension().as_bytes());
    }

    CacheFingerprint(format!("{:x}", hasher.finalize()))
}
