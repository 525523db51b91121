//! Content-addressed audio cache.
//!
//! There is no index: an artifact exists iff `<root>/<fingerprint>.<ext>`
//! exists. Writers stage into hidden `.partial` siblings and rename on
//! success, so a visible path always holds a complete file.

use crate::domain::tts::{AudioFormat, CacheFingerprint};
use std::io;
use std::path::{Path, PathBuf};

pub struct AudioCacheStore {
    root: PathBuf,
    url_prefix: String,
}

impl AudioCacheStore {
    /// `url_prefix` is where the root is served over HTTP, e.g.
    /// `/static/audio_cache`
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_root(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Pure path construction
    pub fn path_for(&self, fingerprint: &CacheFingerprint, format: AudioFormat) -> PathBuf {
        self.root.join(file_name(fingerprint, format))
    }

    pub fn url_for(&self, fingerprint: &CacheFingerprint, format: AudioFormat) -> String {
        format!("{}/{}", self.url_prefix, file_name(fingerprint, format))
    }

    /// Existence probe only; no content validation
    pub async fn lookup(
        &self,
        fingerprint: &CacheFingerprint,
        format: AudioFormat,
    ) -> Option<PathBuf> {
        let path = self.path_for(fingerprint, format);
        match tokio::fs::try_exists(&path).await {
            Ok(true) => Some(path),
            Ok(false) => None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Cache probe failed");
                None
            }
        }
    }

    /// Remove every cached artifact and recreate an empty root
    pub async fn clear(&self) -> io::Result<()> {
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        tokio::fs::create_dir_all(&self.root).await?;
        tracing::info!(root = %self.root.display(), "Audio cache cleared");
        Ok(())
    }

    /// Total bytes held by finished artifacts
    pub async fn size_bytes(&self) -> io::Result<u64> {
        let mut total = 0;
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };

        while let Some(entry) = entries.next_entry().await? {
            // In-flight staging files
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            let metadata = entry.metadata().await?;
            if metadata.is_file() {
                total += metadata.len();
            }
        }

        Ok(total)
    }
}

fn file_name(fingerprint: &CacheFingerprint, format: AudioFormat) -> String {
    format!("{}.{}", fingerprint, format.extension())
}
