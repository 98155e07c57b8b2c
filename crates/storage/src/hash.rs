//! Content hashing for duplicate detection.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// BLAKE3 digest of a file's contents.
pub type ContentHash = blake3::Hash;

/// Hashes a file on the local filesystem.
///
/// Screenshots can be multi-gigabyte video captures, so the file is streamed
/// through the hasher on a blocking thread instead of being read into memory.
pub async fn hash_file(path: impl Into<PathBuf>) -> Result<ContentHash> {
    let path = path.into();
    let task_path = path.clone();
    tokio::task::spawn_blocking(move || hash_file_blocking(&task_path))
        .await
        .or_raise(|| ErrorKind::BackendError(format!("hashing task for {} did not complete", path.display())))?
}

fn hash_file_blocking(path: &Path) -> Result<ContentHash> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
        std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
        _ => ErrorKind::Io(e),
    })?;
    let mut hasher = blake3::Hasher::new();
    hasher.update_reader(file).map_err(ErrorKind::Io)?;
    Ok(hasher.finalize())
}
