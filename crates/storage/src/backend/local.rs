//! Local filesystem storage backend.
//!
//! Files are stored in a configured directory and accessed using standard
//! filesystem operations via `tokio::fs` for async I/O.

use crate::error::ErrorKind;
use crate::hash::{ContentHash, hash_file};
use crate::{StorageBackend, error::Result, path::validate as validate_path};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};

/// Local filesystem storage backend.
///
/// All paths are relative to the configured root directory.
///
/// # Examples
///
/// ```no_run
/// use gsm_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = LocalBackend::new("output", "/home/me/Screenshots")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LocalBackend {
    name: String,
    /// Root directory for the library
    root: PathBuf,
}
impl LocalBackend {
    /// Create a new local filesystem backend.
    ///
    /// The root does not have to exist yet; it is created lazily by the first
    /// [`create_dir`](StorageBackend::create_dir) call so that dry runs leave
    /// no trace on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute, or exists but is not a
    /// directory.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        if root.exists() && !root.is_dir() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        Ok(Self { name: name.into(), root })
    }

    /// Root directory this backend writes into.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the absolute path for a relative storage path.
    ///
    /// Validates the path and joins it with the root directory.
    fn absolute_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let validated = validate_path(path.as_ref())?;
        Ok(self.root.join(validated))
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            std::io::ErrorKind::AlreadyExists => ErrorKind::AlreadyExists(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::try_exists(&abs_path).await.map_err(ErrorKind::Io)?)
    }

    async fn create_dir(&self, path: &Path) -> Result<()> {
        let abs_path = self.absolute_path(path)?;
        // `create_dir_all` already treats a directory that exists (or that
        // another task creates while we're walking the components) as success.
        Ok(fs::create_dir_all(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?)
    }

    async fn import(&self, source: &Path, destination: &Path) -> Result<u64> {
        let abs_destination = self.absolute_path(destination)?;
        let metadata = fs::metadata(source).await.map_err(|e| Self::map_io_error(e, source))?;
        if !metadata.is_file() {
            exn::bail!(ErrorKind::NotAFile(source.to_path_buf()));
        }
        let mut reader = fs::File::open(source).await.map_err(|e| Self::map_io_error(e, source))?;
        let mut writer = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&abs_destination)
            .await
            .map_err(|e| Self::map_io_error(e, destination))?;
        let bytes = tokio::io::copy(&mut reader, &mut writer).await.map_err(ErrorKind::Io)?;
        // Surface late write errors instead of losing them on drop.
        writer.sync_all().await.map_err(ErrorKind::Io)?;
        Ok(bytes)
    }

    async fn hash(&self, path: &Path) -> Result<ContentHash> {
        let abs_path = self.absolute_path(path)?;
        hash_file(abs_path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> (tempfile::TempDir, LocalBackend) {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path().join("library")).unwrap();
        (temp_dir, backend)
    }

    fn source(dir: &tempfile::TempDir, name: &str, data: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn test_new_requires_absolute_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(LocalBackend::new("name", temp_dir.path()).is_ok());
        assert!(LocalBackend::new("name", "relative/path").is_err());
        assert!(LocalBackend::new("name", "./relative").is_err());
    }

    #[test]
    fn test_new_does_not_create_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("Output");
        LocalBackend::new("name", &root).unwrap();
        assert!(!root.exists());
    }

    #[test]
    fn test_new_rejects_file_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = source(&temp_dir, "file", b"data");
        assert!(LocalBackend::new("name", file).is_err());
    }

    #[test]
    fn test_absolute_path() {
        let (_temp_dir, backend) = backend();
        let expected = backend.root().join("PC/Minecraft/a.png");
        assert_eq!(backend.absolute_path(Path::new("PC/Minecraft/a.png")).unwrap(), expected);
        assert!(backend.absolute_path(Path::new("../etc/passwd")).is_err());
    }

    #[tokio::test]
    async fn test_create_dir_is_idempotent() {
        let (_temp_dir, backend) = backend();
        backend.create_dir(Path::new("PC/Minecraft")).await.unwrap();
        backend.create_dir(Path::new("PC/Minecraft")).await.unwrap();
        assert!(backend.root().join("PC/Minecraft").is_dir());
    }

    #[tokio::test]
    async fn test_concurrent_create_dir() {
        let (_temp_dir, backend) = backend();
        let path = Path::new("PC/Same Game");
        let results = create_concurrently(&backend, path).await;
        assert!(results.iter().all(|r| r.is_ok()));
        assert!(backend.root().join(path).is_dir());
    }

    async fn create_concurrently(backend: &LocalBackend, path: &Path) -> Vec<Result<()>> {
        let (a, b, c, d) = tokio::join!(
            backend.create_dir(path),
            backend.create_dir(path),
            backend.create_dir(path),
            backend.create_dir(path),
        );
        vec![a, b, c, d]
    }

    #[tokio::test]
    async fn test_import_copies_contents() {
        let (temp_dir, backend) = backend();
        let src = source(&temp_dir, "src.png", b"Hello, world!");
        backend.create_dir(Path::new("PC")).await.unwrap();
        let bytes = backend.import(&src, Path::new("PC/copy.png")).await.unwrap();
        assert_eq!(bytes, 13);
        assert_eq!(std::fs::read(backend.root().join("PC/copy.png")).unwrap(), b"Hello, world!");
        // Source is left untouched.
        assert!(src.exists());
    }

    #[tokio::test]
    async fn test_import_never_overwrites() {
        let (temp_dir, backend) = backend();
        let first = source(&temp_dir, "first.png", b"first");
        let second = source(&temp_dir, "second.png", b"second");
        backend.create_dir(Path::new("PC")).await.unwrap();
        backend.import(&first, Path::new("PC/shot.png")).await.unwrap();
        let err = backend.import(&second, Path::new("PC/shot.png")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::AlreadyExists(_)));
        assert_eq!(std::fs::read(backend.root().join("PC/shot.png")).unwrap(), b"first");
    }

    #[tokio::test]
    async fn test_import_rejects_directories() {
        let (temp_dir, backend) = backend();
        backend.create_dir(Path::new("PC")).await.unwrap();
        let err = backend.import(temp_dir.path(), Path::new("PC/dir.png")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotAFile(_)));
    }

    #[tokio::test]
    async fn test_import_missing_source() {
        let (temp_dir, backend) = backend();
        backend.create_dir(Path::new("PC")).await.unwrap();
        let err = backend.import(&temp_dir.path().join("nope.png"), Path::new("PC/nope.png")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_exists() {
        let (temp_dir, backend) = backend();
        assert!(!backend.exists(Path::new("PC/a.png")).await.unwrap());
        let src = source(&temp_dir, "a.png", b"data");
        backend.create_dir(Path::new("PC")).await.unwrap();
        backend.import(&src, Path::new("PC/a.png")).await.unwrap();
        assert!(backend.exists(Path::new("PC/a.png")).await.unwrap());
    }

    #[tokio::test]
    async fn test_hash() {
        let (temp_dir, backend) = backend();
        let src = source(&temp_dir, "a.png", b"data");
        backend.create_dir(Path::new("PC")).await.unwrap();
        backend.import(&src, Path::new("PC/a.png")).await.unwrap();
        assert_eq!(backend.hash(Path::new("PC/a.png")).await.unwrap(), blake3::hash(b"data"));
    }
}
