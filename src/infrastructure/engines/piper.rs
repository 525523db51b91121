use super::models::ModelDirectory;
use super::process::run_with_stdin;
use crate::domain::tts::{EngineKind, SynthesisError, SynthesisRequest, Voice};
use std::path::Path;
use tokio::process::Command;

/// Piper command-line synthesizer. One `.onnx` model per voice.
pub struct PiperEngine {
    binary: String,
    models: ModelDirectory,
}

impl PiperEngine {
    pub fn new(binary: impl Into<String>, models_root: &Path) -> Self {
        Self {
            binary: binary.into(),
            models: ModelDirectory::new(EngineKind::Piper, models_root.join("piper"), "onnx"),
        }
    }

    pub async fn list_voices(&self) -> Result<Vec<Voice>, SynthesisError> {
        self.models.list().await
    }

    pub async fn render(
        &self,
        request: &SynthesisRequest,
        output: &Path,
    ) -> Result<(), SynthesisError> {
        let model = self.models.resolve(request.voice()).await?;
        let command = self.command(&model, output);
        run_with_stdin(EngineKind::Piper, command, request.text()).await
    }

    fn command(&self, model: &Path, output: &Path) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg("--model")
            .arg(model)
            .arg("--output_file")
            .arg(output);
        command
    }
}
