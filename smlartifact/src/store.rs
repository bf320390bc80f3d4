//! Storage backends for rendered artifacts
//!
//! [`ArtifactStore`] is the only place where generation touches the outside
//! world. [`FsArtifactStore`] writes real files; [`MemoryArtifactStore`] keeps
//! everything in memory and counts writes, for tests.

use crate::error::{ArtifactError, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

#[async_trait]
pub trait ArtifactStore: Debug + Send + Sync {
    /// Writes `content` at `path`, replacing any existing file.
    /// The parent directory must exist.
    async fn write(&self, path: &Path, content: &[u8]) -> Result<()>;

    /// Reads the file at `path`; [`ArtifactError::NotFound`] when absent
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Removes the file at `path`. A missing file is not an error; the
    /// returned flag tells whether something was removed.
    async fn delete(&self, path: &Path) -> Result<bool>;

    /// Creates `path` and its parents (idempotent)
    async fn ensure_dir(&self, path: &Path) -> Result<()>;

    /// Removes the directory at `path` if it exists and is empty
    async fn remove_dir_if_empty(&self, path: &Path) -> Result<bool>;

    async fn exists(&self, path: &Path) -> Result<bool>;
}

/// Filesystem-backed store
#[derive(Debug, Clone, Copy, Default)]
pub struct FsArtifactStore;

impl FsArtifactStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn write(&self, path: &Path, content: &[u8]) -> Result<()> {
        tokio::fs::write(path, content)
            .await
            .map_err(|e| ArtifactError::filesystem(path, e))?;
        debug!("Wrote {} bytes to {}", content.len(), path.display());
        Ok(())
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        match tokio::fs::read(path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ArtifactError::NotFound(path.to_path_buf()))
            }
            Err(e) => Err(ArtifactError::filesystem(path, e)),
        }
    }

    async fn delete(&self, path: &Path) -> Result<bool> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Nothing to delete at {}", path.display());
                Ok(false)
            }
            Err(e) => Err(ArtifactError::filesystem(path, e)),
        }
    }

    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| ArtifactError::filesystem(path, e))
    }

    async fn remove_dir_if_empty(&self, path: &Path) -> Result<bool> {
        let mut entries = match tokio::fs::read_dir(path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(ArtifactError::filesystem(path, e)),
        };

        let has_entries = entries
            .next_entry()
            .await
            .map_err(|e| ArtifactError::filesystem(path, e))?
            .is_some();
        if has_entries {
            return Ok(false);
        }

        tokio::fs::remove_dir(path)
            .await
            .map_err(|e| ArtifactError::filesystem(path, e))?;
        debug!("Removed empty directory {}", path.display());
        Ok(true)
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        tokio::fs::try_exists(path)
            .await
            .map_err(|e| ArtifactError::filesystem(path, e))
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
    writes: usize,
}

/// In-memory store mirroring the filesystem rules (a write needs its parent
/// directory, deleting a missing file is fine)
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    state: Mutex<MemoryState>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful writes since creation
    pub async fn write_count(&self) -> usize {
        self.state.lock().await.writes
    }

    /// Paths of the stored files, sorted
    pub async fn files(&self) -> Vec<PathBuf> {
        self.state.lock().await.files.keys().cloned().collect()
    }

    pub async fn has_dir(&self, path: &Path) -> bool {
        self.state.lock().await.dirs.contains(path)
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn write(&self, path: &Path, content: &[u8]) -> Result<()> {
        let mut state = self.state.lock().await;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !state.dirs.contains(parent) {
                return Err(ArtifactError::filesystem(
                    path,
                    io::Error::new(io::ErrorKind::NotFound, "parent directory does not exist"),
                ));
            }
        }
        state.files.insert(path.to_path_buf(), content.to_vec());
        state.writes += 1;
        Ok(())
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.state
            .lock()
            .await
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| ArtifactError::NotFound(path.to_path_buf()))
    }

    async fn delete(&self, path: &Path) -> Result<bool> {
        Ok(self.state.lock().await.files.remove(path).is_some())
    }

    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        let mut state = self.state.lock().await;
        for ancestor in path.ancestors().filter(|p| !p.as_os_str().is_empty()) {
            state.dirs.insert(ancestor.to_path_buf());
        }
        Ok(())
    }

    async fn remove_dir_if_empty(&self, path: &Path) -> Result<bool> {
        let mut state = self.state.lock().await;
        let occupied = state.files.keys().any(|f| f.parent() == Some(path))
            || state.dirs.iter().any(|d| d.parent() == Some(path));
        if occupied {
            return Ok(false);
        }
        Ok(state.dirs.remove(path))
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let state = self.state.lock().await;
        Ok(state.files.contains_key(path) || state.dirs.contains(path))
    }
}
