use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tts_shelf::domain::tts::{
    Credentials, EngineKind, SynthesisError, SynthesisRequest, Voice, KITTEN_VOICES,
    OPENAI_VOICES,
};
use tts_shelf::infrastructure::engines::SpeechSynthesizer;

/// Voice id that makes the fake engine fail like a crashed subprocess
pub const FAILING_VOICE: &str = "broken-voice";

/// Stands in for every backend: "renders" the request text as the file body
/// after a short delay, and counts dispatches.
#[derive(Default)]
pub struct FakeEngine {
    pub calls: AtomicUsize,
}

impl FakeEngine {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeEngine {
    async fn synthesize(
        &self,
        request: &SynthesisRequest,
        output: &Path,
    ) -> Result<(), SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(30)).await;

        if request.voice() == FAILING_VOICE {
            return Err(SynthesisError::EngineProcessFailed {
                engine: request.engine(),
                code: Some(1),
                stderr: "model file is corrupt".to_string(),
            });
        }

        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(output, format!("audio:{}", request.text())).await?;
        Ok(())
    }

    async fn list_voices(
        &self,
        engine: EngineKind,
        _credentials: Option<&Credentials>,
    ) -> Result<Vec<Voice>, SynthesisError> {
        let ids: Vec<&str> = match engine {
            EngineKind::Openai => OPENAI_VOICES.to_vec(),
            EngineKind::Kitten => KITTEN_VOICES.to_vec(),
            EngineKind::Piper => vec!["en_US-lessac-medium"],
            _ => Vec::new(),
        };
        Ok(ids.into_iter().map(|id| Voice::new(engine, id)).collect())
    }

    /// No server-side keys are configured
    fn has_credentials(&self, engine: EngineKind, credentials: Option<&Credentials>) -> bool {
        engine.is_local() || credentials.is_some()
    }
}
