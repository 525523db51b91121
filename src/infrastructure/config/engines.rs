use crate::domain::tts::EngineKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Configuration for one TTS engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub name: EngineKind,
    pub enabled: bool,
    pub display_name: String,
    pub description: String,
    pub requires_api_key: bool,
    pub requires_model_files: bool,
    pub model_directory: Option<String>,
}

/// Partial override read from the user's engine configuration file
#[derive(Debug, Default, Deserialize)]
struct EngineOverride {
    enabled: Option<bool>,
    display_name: Option<String>,
    description: Option<String>,
}

impl EngineConfig {
    fn new(name: EngineKind, display_name: &str, description: &str) -> Self {
        Self {
            name,
            enabled: true,
            display_name: display_name.to_string(),
            description: description.to_string(),
            requires_api_key: false,
            requires_model_files: false,
            model_directory: None,
        }
    }

    fn with_models(mut self, directory: &str) -> Self {
        self.requires_model_files = true;
        self.model_directory = Some(directory.to_string());
        self
    }

    fn with_api_key(mut self) -> Self {
        self.requires_api_key = true;
        self
    }

    fn apply(&mut self, over: EngineOverride) {
        if let Some(enabled) = over.enabled {
            self.enabled = enabled;
        }
        if let Some(display_name) = over.display_name {
            self.display_name = display_name;
        }
        if let Some(description) = over.description {
            self.description = description;
        }
    }
}

fn default_engines() -> BTreeMap<EngineKind, EngineConfig> {
    [
        EngineConfig::new(EngineKind::Piper, "Piper", "Local TTS with memory efficient voices")
            .with_models("piper"),
        EngineConfig::new(EngineKind::Kokoro, "Kokoro", "Local TTS with expressive voices")
            .with_models("kokoro"),
        EngineConfig::new(EngineKind::Coqui, "Coqui", "Local TTS voice cloning")
            .with_models("coqui"),
        EngineConfig::new(EngineKind::Kitten, "Kitten", "Local TTS with compact models"),
        EngineConfig::new(
            EngineKind::Gemini,
            "Google Cloud TTS",
            "Cloud-based TTS with high quality voices",
        )
        .with_api_key(),
        EngineConfig::new(EngineKind::Openai, "OpenAI", "Cloud-based TTS from the OpenAI API")
            .with_api_key(),
    ]
    .into_iter()
    .map(|config| (config.name, config))
    .collect()
}

/// Point-in-time copy of the engine table. Requests work against a snapshot
/// so toggling an engine never changes a request already in progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineSnapshot {
    engines: BTreeMap<EngineKind, EngineConfig>,
}

impl EngineSnapshot {
    pub fn is_enabled(&self, engine: EngineKind) -> bool {
        self.engines.get(&engine).map(|c| c.enabled).unwrap_or(false)
    }

    pub fn enabled(&self) -> Vec<EngineKind> {
        self.engines
            .values()
            .filter(|c| c.enabled)
            .map(|c| c.name)
            .collect()
    }

    pub fn get(&self, engine: EngineKind) -> Option<&EngineConfig> {
        self.engines.get(&engine)
    }

    pub fn all(&self) -> Vec<EngineConfig> {
        self.engines.values().cloned().collect()
    }
}

/// Engine enable/disable table backed by a JSON file
pub struct EngineSettings {
    path: PathBuf,
    engines: RwLock<BTreeMap<EngineKind, EngineConfig>>,
}

impl EngineSettings {
    /// Load defaults and merge the user's overrides, if any
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut engines = default_engines();

        if let Err(e) = merge_overrides(&path, &mut engines).await {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Could not load engine configuration, using defaults"
            );
        }

        Self {
            path,
            engines: RwLock::new(engines),
        }
    }

    /// Default table without reading `path`; toggles still persist there
    pub fn defaults(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            engines: RwLock::new(default_engines()),
        }
    }

    pub async fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            engines: self.engines.read().await.clone(),
        }
    }

    /// Toggle an engine and persist the full table
    pub async fn set_enabled(
        &self,
        engine: EngineKind,
        enabled: bool,
    ) -> std::io::Result<EngineSnapshot> {
        let mut engines = self.engines.write().await;
        if let Some(config) = engines.get_mut(&engine) {
            config.enabled = enabled;
        }

        let by_name: BTreeMap<&str, &EngineConfig> =
            engines.iter().map(|(k, v)| (k.as_str(), v)).collect();
        let body = serde_json::to_vec_pretty(&by_name)?;
        write_atomically(&self.path, &body).await?;

        tracing::info!(engine = %engine, enabled, "Engine configuration updated");

        Ok(EngineSnapshot {
            engines: engines.clone(),
        })
    }
}

async fn merge_overrides(
    path: &Path,
    engines: &mut BTreeMap<EngineKind, EngineConfig>,
) -> anyhow::Result<()> {
    if !tokio::fs::try_exists(path).await? {
        return Ok(());
    }

    let raw = tokio::fs::read(path).await?;
    let overrides: BTreeMap<String, EngineOverride> = serde_json::from_slice(&raw)?;

    for (name, over) in overrides {
        match name.parse::<EngineKind>() {
            Ok(kind) => {
                if let Some(config) = engines.get_mut(&kind) {
                    config.apply(over);
                }
            }
            Err(_) => tracing::debug!(engine = %name, "Ignoring unknown engine in configuration"),
        }
    }

    Ok(())
}

async fn write_atomically(path: &Path, body: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4()));
    tokio::fs::write(&tmp, body).await?;
    tokio::fs::rename(&tmp, path).await
}
