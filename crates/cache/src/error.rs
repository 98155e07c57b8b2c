//! Cache Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// [`ErrorKind::NotFound`] is not really a failure: it's how a cache miss is
/// reported, and callers are expected to match on it and fetch the value
/// from its origin instead.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The key has no entry, or the entry expired.
    #[display("cache key not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// Keys are used as file names by [`FileCache`](crate::FileCache).
    #[display("invalid cache key: {_0:?}")]
    InvalidKey(#[error(not(source))] String),
    /// No platform cache directory could be determined.
    #[display("cache directory not available")]
    NoCacheDir,
    #[display("cache storage error: {}", _0.display())]
    Storage(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if this represents a cache miss rather than a failure.
    pub fn is_miss(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}
