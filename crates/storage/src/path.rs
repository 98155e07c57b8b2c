//! Path validation and security utilities.
//!
//! Game names and platform labels come straight from provider metadata and
//! end up as directory names. Everything joined onto the library root goes
//! through these checks first.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates a storage path for security and correctness.
/// Ensures that paths don't escape the storage root (no `..` traversal).
///
/// > **Note:** This does **not** normalize backslashes, non-UTF8 bytes, or
/// >           platform-specific weirdness. Null bytes are explicitly rejected.
///
/// # Returns
/// Returns the normalized path if valid, or [`InvalidPath`](crate::error::ErrorKind::InvalidPath)
/// if invalid.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use gsm_storage::validate_path;
/// // Valid paths
/// assert!(validate_path("PC/Minecraft/2024-01-01_10-00-00.png").is_ok());
/// assert!(validate_path("a/../file.png").is_ok()); // (never leaves library root)
/// // Invalid paths
/// assert!(validate_path("../etc/passwd").is_err());
/// assert!(validate_path("a/../../b").is_err()); // (leaves library root)
/// assert!(validate_path("a\0b").is_err());
/// // Paths get resolved
/// assert_eq!(
///     validate_path("wrong/../PC/./Minecraft//.cover/").unwrap(),
///     Path::new("PC/Minecraft/.cover")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let mut components = Vec::new();
    for component in path.as_ref().components() {
        match component {
            Component::Normal(s) => {
                // Null bytes pass through Path::components() on Unix but cause
                // truncation in C-based syscalls; reject them explicitly.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
                components.push(s)
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
            },
        }
    }
    match components.is_empty() {
        true => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
        false => Ok(components.into_iter().collect()),
    }
}

/// Validates a single directory or file name.
///
/// A segment must be exactly one normal path component: no separators, no
/// `.`/`..`, no null bytes, not empty. Surrounding whitespace is rejected too
/// since most filesystems either strip it or choke on it.
///
/// ```
/// use gsm_storage::validate_segment;
/// assert!(validate_segment("Nintendo Switch").is_ok());
/// assert!(validate_segment("Half-Life: Alyx").is_ok());
/// assert!(validate_segment("AC/DC Live").is_err());
/// assert!(validate_segment("..").is_err());
/// assert!(validate_segment("").is_err());
/// ```
pub fn validate_segment(segment: &str) -> Result<&str> {
    let invalid = || ErrorKind::InvalidPath(PathBuf::from(segment));
    if segment.is_empty() || segment.trim() != segment || segment.contains('\0') {
        exn::bail!(invalid());
    }
    let mut components = Path::new(segment).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(s)), None) if s == segment => Ok(segment),
        _ => exn::bail!(invalid()),
    }
}
