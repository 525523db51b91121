use super::engine::EngineKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Voices bundled with the kitten model; no files on disk
pub const KITTEN_VOICES: [&str; 8] = [
    "expr-voice-2-m",
    "expr-voice-2-f",
    "expr-voice-3-m",
    "expr-voice-3-f",
    "expr-voice-4-m",
    "expr-voice-4-f",
    "expr-voice-5-m",
    "expr-voice-5-f",
];

/// Voices offered by the OpenAI speech endpoint
pub const OPENAI_VOICES: [&str; 6] = ["alloy", "echo", "fable", "onyx", "nova", "shimmer"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub name: String,
}

impl Voice {
    pub fn new(engine: EngineKind, id: impl Into<String>) -> Self {
        let id = id.into();
        let name = format!("{}: {}", capitalize(engine.as_str()), id);
        Self { id, name }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceAlias {
    pub engine: EngineKind,
    pub voice_id: String,
}

/// Immutable alias table mapping OpenAI-style voice names onto
/// `(engine, voice)` pairs. Built fresh from the current engine settings and
/// voice listings whenever a caller needs one.
#[derive(Debug, Clone, Default)]
pub struct VoiceCatalog {
    aliases: BTreeMap<String, VoiceAlias>,
}

impl VoiceCatalog {
    pub fn build<'a, I>(listings: I) -> Self
    where
        I: IntoIterator<Item = (EngineKind, &'a [Voice])>,
    {
        let mut aliases = BTreeMap::new();

        for (engine, voices) in listings {
            for voice in voices {
                let alias = match engine {
                    EngineKind::Openai => voice.id.to_lowercase(),
                    _ => alias_for(engine, &voice.id),
                };
                aliases.insert(
                    alias,
                    VoiceAlias {
                        engine,
                        voice_id: voice.id.clone(),
                    },
                );
            }
        }

        Self { aliases }
    }

    pub fn resolve(&self, alias: &str) -> Option<&VoiceAlias> {
        self.aliases.get(alias)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &VoiceAlias)> {
        self.aliases.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.aliases.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

fn alias_for(engine: EngineKind, voice_id: &str) -> String {
    format!("{}-{}", engine.as_str(), voice_id)
        .replace(' ', "-")
        .to_lowercase()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
