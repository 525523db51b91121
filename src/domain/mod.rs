pub mod content;
pub mod library;
pub mod tts;
