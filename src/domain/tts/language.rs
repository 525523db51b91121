use lingua::{Language, LanguageDetector, LanguageDetectorBuilder};
use serde::{Deserialize, Serialize};

/// ISO 639-1 language codes the detector can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LanguageCode {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "pt")]
    Portuguese,
}

impl LanguageCode {
    /// Get the ISO 639-1 code as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageCode::English => "en",
            LanguageCode::Spanish => "es",
            LanguageCode::French => "fr",
            LanguageCode::German => "de",
            LanguageCode::Italian => "it",
            LanguageCode::Portuguese => "pt",
        }
    }

    /// Convert lingua Language to LanguageCode
    pub fn from_lingua(language: Language) -> Self {
        match language {
            Language::English => LanguageCode::English,
            Language::Spanish => LanguageCode::Spanish,
            Language::French => LanguageCode::French,
            Language::German => LanguageCode::German,
            Language::Italian => LanguageCode::Italian,
            Language::Portuguese => LanguageCode::Portuguese,
        }
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shared lingua detector. Building one is expensive, so services hold a
/// single instance.
pub struct LanguageGuesser {
    detector: LanguageDetector,
}

impl LanguageGuesser {
    pub fn new() -> Self {
        Self {
            detector: LanguageDetectorBuilder::from_all_languages().build(),
        }
    }

    /// Detect the language of `text`, if any supported language is likely
    pub fn detect(&self, text: &str) -> Option<LanguageCode> {
        self.detector
            .detect_language_of(text)
            .map(LanguageCode::from_lingua)
    }

    /// Detect the language of `text`, falling back to English
    pub fn detect_or_default(&self, text: &str) -> LanguageCode {
        match self.detect(text) {
            Some(language) => language,
            None => {
                tracing::warn!("Could not detect language, falling back to English");
                LanguageCode::English
            }
        }
    }
}

impl Default for LanguageGuesser {
    fn default() -> Self {
        Self::new()
    }
}
