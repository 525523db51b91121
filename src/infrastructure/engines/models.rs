use crate::domain::tts::{EngineKind, SynthesisError, Voice};
use std::path::{Path, PathBuf};

/// A directory of per-voice model files sharing one extension,
/// e.g. `models/piper/*.onnx`
#[derive(Debug, Clone)]
pub struct ModelDirectory {
    engine: EngineKind,
    dir: PathBuf,
    extension: &'static str,
}

impl ModelDirectory {
    pub fn new(engine: EngineKind, dir: impl Into<PathBuf>, extension: &'static str) -> Self {
        Self {
            engine,
            dir: dir.into(),
            extension,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Map a voice id onto its model file. Ids never leave the directory.
    pub async fn resolve(&self, voice: &str) -> Result<PathBuf, SynthesisError> {
        let not_found = || SynthesisError::VoiceNotFound {
            engine: self.engine,
            voice: voice.to_string(),
        };

        if voice.is_empty() || voice.contains(['/', '\\']) || voice.starts_with('.') {
            return Err(not_found());
        }

        let path = self.dir.join(format!("{}.{}", voice, self.extension));
        match tokio::fs::try_exists(&path).await {
            Ok(true) => Ok(path),
            _ => Err(not_found()),
        }
    }

    /// Voices present on disk, sorted by id. A missing directory lists nothing.
    pub async fn list(&self) -> Result<Vec<Voice>, SynthesisError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(dir = %self.dir.display(), "Model directory missing");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(self.extension) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();

        Ok(ids
            .into_iter()
            .map(|id| Voice::new(self.engine, id))
            .collect())
    }
}
