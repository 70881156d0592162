//! Download targets.

use std::future::Future;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::info;

use super::error::ExportError;

/// A named file ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub media_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Trait for handing an artifact to the user.
pub trait DownloadSink: Send + Sync {
    /// Deliver `artifact`, returning where it ended up.
    fn deliver(&self, artifact: Artifact)
        -> impl Future<Output = Result<PathBuf, ExportError>> + Send;
}

/// Sink writing artifacts into a directory, overwriting existing files.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    async fn deliver(&self, artifact: Artifact) -> Result<PathBuf, ExportError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ExportError::CreateDir {
                path: self.dir.clone(),
                source: e,
            })?;

        let path = self.dir.join(&artifact.filename);
        tokio::fs::write(&path, &artifact.bytes)
            .await
            .map_err(|e| ExportError::Write {
                path: path.clone(),
                source: e,
            })?;

        info!(
            path = %path.display(),
            bytes = artifact.bytes.len(),
            media_type = artifact.media_type,
            "Artifact written"
        );
        Ok(path)
    }
}

/// Sink keeping artifacts in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    delivered: Mutex<Vec<Artifact>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Artifacts delivered so far, oldest first.
    pub fn delivered(&self) -> Vec<Artifact> {
        self.delivered.lock().clone()
    }
}

impl DownloadSink for MemorySink {
    async fn deliver(&self, artifact: Artifact) -> Result<PathBuf, ExportError> {
        let path = PathBuf::from(&artifact.filename);
        self.delivered.lock().push(artifact);
        Ok(path)
    }
}
