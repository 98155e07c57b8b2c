//! Shared fixtures for the crate's tests.

use crate::Context;
use async_trait::async_trait;
use gsm_fetch::error::Result as FetchResult;
use gsm_fetch::{Fetch, FetchHandle};
use gsm_storage::BackendHandle;
use gsm_storage::backend::{LocalBackend, ReadOnlyBackend};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::{NamedTempFile, TempDir};
use time::{OffsetDateTime, UtcOffset};

/// Serves the same body for every URL and counts downloads.
pub(crate) struct FakeFetch {
    body: Vec<u8>,
    calls: AtomicUsize,
}
impl FakeFetch {
    pub(crate) fn new(body: &[u8]) -> Arc<Self> {
        Arc::new(Self { body: body.to_vec(), calls: AtomicUsize::new(0) })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetch for FakeFetch {
    async fn download(&self, _url: &str) -> FetchResult<NamedTempFile> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&self.body).unwrap();
        Ok(file)
    }
}

/// A source directory and an output library root inside one temp dir.
pub(crate) struct Fixture {
    dir: TempDir,
    pub(crate) output: PathBuf,
}
impl Fixture {
    pub(crate) fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("Output");
        std::fs::create_dir(dir.path().join("src")).unwrap();
        Self { dir, output }
    }

    /// Writes a source screenshot, optionally with a fixed modification time.
    pub(crate) fn source(&self, name: &str, data: &[u8], modified: Option<OffsetDateTime>) -> PathBuf {
        let path = self.dir.path().join("src").join(name);
        std::fs::write(&path, data).unwrap();
        if let Some(modified) = modified {
            std::fs::File::options().write(true).open(&path).unwrap().set_modified(modified.into()).unwrap();
        }
        path
    }

    pub(crate) fn backend(&self) -> BackendHandle {
        Arc::new(LocalBackend::new("output", &self.output).unwrap())
    }

    pub(crate) fn context(&self, dry_run: bool, download_covers: bool, fetcher: FetchHandle) -> Context {
        let backend = match dry_run {
            true => Arc::new(ReadOnlyBackend::new(self.backend())) as BackendHandle,
            false => self.backend(),
        };
        Context { backend, fetcher, dry_run, download_covers, utc_offset: UtcOffset::UTC }
    }

    pub(crate) fn output(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.output.join(relative)
    }
}
