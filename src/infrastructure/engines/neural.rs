//! Local neural engines (kokoro, coqui, kitten).
//!
//! Model loading is not done in-process. Each engine is backed by an
//! injected [`NeuralPipeline`]; the bundled [`CommandPipeline`] drives a
//! configured command line. Voice resolution and language hints are handled
//! here so every pipeline receives the same fully resolved [`RenderJob`].

use super::models::ModelDirectory;
use super::process::run_with_stdin;
use crate::domain::tts::{
    EngineKind, LanguageGuesser, SynthesisError, SynthesisRequest, Voice, KITTEN_VOICES,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;

/// Everything a pipeline needs to render one utterance
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    pub engine: EngineKind,
    pub voice_id: String,
    /// Model or reference sample for the voice, when it lives on disk
    pub voice_path: Option<PathBuf>,
    pub language: String,
    pub text: String,
    pub output: PathBuf,
}

/// Capability that turns a resolved job into a waveform file at `job.output`
#[async_trait]
pub trait NeuralPipeline: Send + Sync {
    async fn render(&self, job: &RenderJob) -> Result<(), SynthesisError>;
}

/// Runs a command template such as
/// `python -m kokoro --voice {voice} --lang {lang} --out {output}`
/// with the text on stdin.
#[derive(Debug, Clone)]
pub struct CommandPipeline {
    program: String,
    args: Vec<String>,
}

impl CommandPipeline {
    /// `None` for a blank template
    pub fn parse(template: &str) -> Option<Self> {
        let mut parts = template.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    fn expand(arg: &str, job: &RenderJob) -> String {
        let voice = job
            .voice_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| job.voice_id.clone());

        arg.replace("{voice}", &voice)
            .replace("{voice_id}", &job.voice_id)
            .replace("{lang}", &job.language)
            .replace("{output}", &job.output.display().to_string())
    }
}

#[async_trait]
impl NeuralPipeline for CommandPipeline {
    async fn render(&self, job: &RenderJob) -> Result<(), SynthesisError> {
        let mut command = Command::new(&self.program);
        command.args(self.args.iter().map(|arg| Self::expand(arg, job)));
        run_with_stdin(job.engine, command, &job.text).await
    }
}

enum VoiceSource {
    Files(ModelDirectory),
    Static(&'static [&'static str]),
}

enum LanguageHint {
    /// First letter of the voice id (`af_heart` -> `a`)
    VoicePrefix,
    /// Request language, else detected from the text
    RequestOrDetected,
    Fixed(&'static str),
}

pub struct NeuralEngine {
    kind: EngineKind,
    voices: VoiceSource,
    language: LanguageHint,
    pipeline: Option<Arc<dyn NeuralPipeline>>,
    guesser: Arc<LanguageGuesser>,
}

impl NeuralEngine {
    pub fn kokoro(
        models_root: &Path,
        pipeline: Option<Arc<dyn NeuralPipeline>>,
        guesser: Arc<LanguageGuesser>,
    ) -> Self {
        Self {
            kind: EngineKind::Kokoro,
            voices: VoiceSource::Files(ModelDirectory::new(
                EngineKind::Kokoro,
                models_root.join("kokoro"),
                "pt",
            )),
            language: LanguageHint::VoicePrefix,
            pipeline,
            guesser,
        }
    }

    pub fn coqui(
        models_root: &Path,
        pipeline: Option<Arc<dyn NeuralPipeline>>,
        guesser: Arc<LanguageGuesser>,
    ) -> Self {
        Self {
            kind: EngineKind::Coqui,
            voices: VoiceSource::Files(ModelDirectory::new(
                EngineKind::Coqui,
                models_root.join("coqui"),
                "wav",
            )),
            language: LanguageHint::RequestOrDetected,
            pipeline,
            guesser,
        }
    }

    pub fn kitten(pipeline: Option<Arc<dyn NeuralPipeline>>, guesser: Arc<LanguageGuesser>) -> Self {
        Self {
            kind: EngineKind::Kitten,
            voices: VoiceSource::Static(&KITTEN_VOICES),
            language: LanguageHint::Fixed("en"),
            pipeline,
            guesser,
        }
    }

    pub async fn list_voices(&self) -> Result<Vec<Voice>, SynthesisError> {
        match &self.voices {
            VoiceSource::Files(models) => models.list().await,
            VoiceSource::Static(ids) => Ok(ids.iter().map(|id| Voice::new(self.kind, *id)).collect()),
        }
    }

    pub async fn render(
        &self,
        request: &SynthesisRequest,
        output: &Path,
    ) -> Result<(), SynthesisError> {
        let pipeline = self.pipeline.as_ref().ok_or_else(|| {
            SynthesisError::UnsupportedEngine(format!("{} (no pipeline configured)", self.kind))
        })?;

        let job = self.resolve(request, output).await?;
        tracing::debug!(
            engine = %self.kind,
            voice = %job.voice_id,
            language = %job.language,
            "Rendering with local pipeline"
        );
        pipeline.render(&job).await
    }

    async fn resolve(
        &self,
        request: &SynthesisRequest,
        output: &Path,
    ) -> Result<RenderJob, SynthesisError> {
        let voice_id = request.voice().to_string();

        let voice_path = match &self.voices {
            VoiceSource::Files(models) => Some(models.resolve(&voice_id).await?),
            VoiceSource::Static(ids) => {
                if !ids.contains(&voice_id.as_str()) {
                    return Err(SynthesisError::VoiceNotFound {
                        engine: self.kind,
                        voice: voice_id,
                    });
                }
                None
            }
        };

        let language = match self.language {
            LanguageHint::VoicePrefix => voice_id
                .chars()
                .next()
                .map(|c| c.to_ascii_lowercase().to_string())
                .unwrap_or_default(),
            LanguageHint::RequestOrDetected => match request.language() {
                Some(lang) => lang.to_string(),
                None => self.guesser.detect_or_default(request.text()).as_str().to_string(),
            },
            LanguageHint::Fixed(lang) => lang.to_string(),
        };

        Ok(RenderJob {
            engine: self.kind,
            voice_id,
            voice_path,
            language,
            text: request.text().to_string(),
            output: output.to_path_buf(),
        })
    }
}
