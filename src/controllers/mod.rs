pub mod content;
pub mod health;
pub mod library;
pub mod openai;
pub mod tts;
