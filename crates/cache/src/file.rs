//! Filesystem-backed cache.
//!
//! Each key maps to one file directly under the cache root. Freshness is the
//! file's modification time, so "touching" an entry refreshes it and removing
//! the directory simply empties the cache.

use crate::Cache;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use directories::ProjectDirs;
use exn::{OptionExt, ResultExt};
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs;

#[derive(Clone, Debug)]
pub struct FileCache {
    root: PathBuf,
}
impl FileCache {
    /// Cache rooted at an explicit directory, created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache rooted at the platform's per-user cache directory.
    ///
    /// # Errors
    ///
    /// Returns [`NoCacheDir`](ErrorKind::NoCacheDir) if no home directory
    /// can be determined.
    pub fn user() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "games-screenshot-manager").ok_or_raise(|| ErrorKind::NoCacheDir)?;
        Ok(Self::new(dirs.cache_dir()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry(&self, key: &str) -> Result<PathBuf> {
        let key = gsm_storage::validate_segment(key).or_raise(|| ErrorKind::InvalidKey(key.to_string()))?;
        Ok(self.root.join(key))
    }

    fn map_io_error(e: std::io::Error, key: &str, path: &Path) -> ErrorKind {
        match e.kind() {
            IoErrorKind::NotFound | IoErrorKind::PermissionDenied => ErrorKind::NotFound(key.to_string()),
            _ => {
                tracing::debug!(path = %path.display(), error = %e, "Cache entry inaccessible");
                ErrorKind::Storage(path.to_path_buf())
            },
        }
    }

    /// Whether an entry last modified at `modified` is still fresh.
    fn is_fresh(modified: SystemTime, ttl: Duration) -> bool {
        // A modification time in the future (clock skew) counts as fresh.
        modified.elapsed().map(|age| age <= ttl).unwrap_or(true)
    }
}

#[async_trait]
impl Cache for FileCache {
    async fn get(&self, key: &str) -> Result<String> {
        let path = self.entry(key)?;
        Ok(fs::read_to_string(&path).await.map_err(|e| Self::map_io_error(e, key, &path))?)
    }

    async fn get_expiry(&self, key: &str, ttl: Duration) -> Result<String> {
        let path = self.entry(key)?;
        let metadata = fs::metadata(&path).await.map_err(|e| Self::map_io_error(e, key, &path))?;
        let modified = metadata.modified().map_err(|e| Self::map_io_error(e, key, &path))?;
        if !Self::is_fresh(modified, ttl) {
            tracing::debug!(key, "Cache entry expired");
            self.delete(key).await?;
            exn::bail!(ErrorKind::NotFound(key.to_string()));
        }
        self.get(key).await
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let path = self.entry(key)?;
        let root = self.root.clone();
        fs::create_dir_all(&root).await.map_err(|_| ErrorKind::Storage(root.clone()))?;
        let value = value.to_string();
        // Write to a sibling temporary file and rename over the entry so that
        // concurrent readers never observe a half-written value.
        let task_path = path.clone();
        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut temp = tempfile::NamedTempFile::new_in(&root)?;
            temp.write_all(value.as_bytes())?;
            temp.as_file().sync_all()?;
            temp.persist(&task_path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .or_raise(|| ErrorKind::Storage(path.clone()))?
        .or_raise(|| ErrorKind::Storage(path.clone()))?;
        tracing::debug!(key, path = %path.display(), "Cache entry written");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.entry(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(_) => exn::bail!(ErrorKind::Storage(path)),
        }
    }
}
