//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait: the handful of operations
//! the library organizer needs against its output tree. Sources (the
//! provider-discovered screenshots) are always plain absolute paths on the
//! local filesystem; destinations are always relative to the backend root.

mod local;
mod ro;

pub use self::local::LocalBackend;
pub use self::ro::ReadOnlyBackend;
use crate::error::Result;
use crate::hash::ContentHash;
use async_trait::async_trait;
use std::path::Path;

/// Unified interface for the screenshot library's output tree.
///
/// # Path Handling
/// All destination paths are relative to the storage root and must be
/// validated using [`validate_path`](crate::validate_path) before use.
/// Implementations should enforce this validation.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use gsm_storage::{backend::StorageBackend, error::Result};
///
/// async fn place(backend: &dyn StorageBackend, shot: &Path) -> Result<()> {
///     let dir = Path::new("PC/Minecraft");
///     backend.create_dir(dir).await?;
///     let target = dir.join("2024-02-29_12-00-00.png");
///     if !backend.exists(&target).await? {
///         backend.import(shot, &target).await?;
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the configured backend, used for logging only.
    fn name(&self) -> &str;

    /// Check if a file or directory exists.
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Create a directory, including missing parents.
    ///
    /// A directory that already exists (possibly created concurrently by
    /// another worker a moment ago) is not an error.
    async fn create_dir(&self, path: &Path) -> Result<()>;

    /// Copy a file from an absolute local `source` into the library.
    ///
    /// Returns the number of bytes copied.
    ///
    /// # Notes
    /// - The destination is created with create-new semantics: returns
    ///   [`AlreadyExists`](crate::error::ErrorKind::AlreadyExists) rather than
    ///   overwriting, even if the file appeared after the caller checked.
    /// - `source` must be a regular file, otherwise
    ///   [`NotAFile`](crate::error::ErrorKind::NotAFile).
    /// - Parent directories are **not** created.
    /// - The copy is not atomic; a crash mid-copy leaves a partial file.
    async fn import(&self, source: &Path, destination: &Path) -> Result<u64>;

    /// Hash the contents of a file inside the library.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn hash(&self, path: &Path) -> Result<ContentHash>;
}
