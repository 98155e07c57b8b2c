//! Error types for the [`organize`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An organize error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for organize operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of an organize failure.
///
/// Only [`ErrorKind::Directory`] fails a whole game; everything else fails a
/// single screenshot or the cover and is reported alongside the rest.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The game directory could not be created, even under its slug.
    #[display("could not create game directory for {_0:?}")]
    Directory(#[error(not(source))] String),
    /// The destination file name could not be determined.
    #[display("could not determine destination name for {}", _0.display())]
    DestinationName(#[error(not(source))] PathBuf),
    /// A storage backend operation failed.
    #[display("storage operation failed")]
    Storage,
    /// The destination appeared between checking for it and copying to it.
    #[display("destination was created concurrently: {}", _0.display())]
    Race(#[error(not(source))] PathBuf),
    /// Downloading the cover failed.
    #[display("could not download cover from {_0}")]
    Cover(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// Nothing is retried automatically; this only informs the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage | Self::Cover(_))
    }
}
