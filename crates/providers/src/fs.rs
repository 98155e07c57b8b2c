//! Directory listing helpers shared by the adapters.

use exn::ResultExt;
use gsm_games::error::{ErrorKind, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Regular files directly inside `dir`, sorted by name.
pub async fn list_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    list(dir, |file_type| file_type.is_file()).await
}

/// Subdirectories directly inside `dir`, sorted by name.
pub async fn list_dirs(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    list(dir, |file_type| file_type.is_dir()).await
}

async fn list(dir: &Path, keep: impl Fn(&std::fs::FileType) -> bool) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        // Follows symlinks, like the stat-based checks the adapters expect.
        let file_type = match tokio::fs::metadata(entry.path()).await {
            Ok(metadata) => metadata.file_type(),
            Err(e) => {
                tracing::debug!(path = %entry.path().display(), error = %e, "Skipping unreadable entry");
                continue;
            },
        };
        if keep(&file_type) {
            paths.push(entry.path());
        }
    }
    paths.sort();
    Ok(paths)
}

/// Every regular file below `root`, recursively, in a stable order.
///
/// The root must be a readable directory. Anything below it that can't be
/// read is logged and skipped.
pub async fn walk_files(root: &Path) -> Result<Vec<PathBuf>> {
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || walk_files_blocking(&root)).await.or_raise(|| ErrorKind::Task)?
}

fn walk_files_blocking(root: &Path) -> Result<Vec<PathBuf>> {
    let metadata = std::fs::metadata(root).or_raise(|| ErrorKind::InputPath(root.to_path_buf()))?;
    if !metadata.is_dir() {
        exn::bail!(ErrorKind::InputPath(root.to_path_buf()));
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {},
            Err(e) => tracing::warn!(error = %e, "Skipping unreadable entry"),
        }
    }
    Ok(files)
}

/// File name as UTF-8, for adapters that parse names.
pub fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

/// File name without its final extension.
pub fn file_stem(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|stem| stem.to_str())
}
