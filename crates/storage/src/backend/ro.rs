//! Read-only storage backend.
//!
//! Wraps another implementation and prevents write operations from executing,
//! while indicating success on return. This is what dry runs are made of.

use async_trait::async_trait;
use std::path::Path;

use crate::hash::ContentHash;
use crate::{BackendHandle, StorageBackend, error::Result};

/// Read-only storage backend.
///
/// Wraps another backend and silently drops all write operations, logging an
/// [`info event`](tracing::Event) describing what would have happened.
#[derive(Clone)]
pub struct ReadOnlyBackend {
    inner: BackendHandle,
}
impl ReadOnlyBackend {
    pub fn new(inner: BackendHandle) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl StorageBackend for ReadOnlyBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        self.inner.exists(path).await
    }

    async fn create_dir(&self, path: &Path) -> Result<()> {
        tracing::info!(path = %path.display(), "Skipping directory creation during dry run");
        Ok(())
    }

    async fn import(&self, source: &Path, destination: &Path) -> Result<u64> {
        tracing::info!(
            source = %source.display(),
            destination = %destination.display(),
            "Skipping copy during dry run"
        );
        Ok(0)
    }

    async fn hash(&self, path: &Path) -> Result<ContentHash> {
        self.inner.hash(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalBackend;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_writes_are_dropped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("Output");
        let inner: BackendHandle = Arc::new(LocalBackend::new("local", &root).unwrap());
        let backend = ReadOnlyBackend::new(inner);
        let src = temp_dir.path().join("a.png");
        std::fs::write(&src, b"data").unwrap();

        backend.create_dir(Path::new("PC/Game")).await.unwrap();
        assert_eq!(backend.import(&src, Path::new("PC/Game/a.png")).await.unwrap(), 0);
        assert!(!root.exists());
        assert!(!backend.exists(Path::new("PC/Game/a.png")).await.unwrap());
        assert_eq!(backend.name(), "local");
    }
}
