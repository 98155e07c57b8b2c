//! Discovery Error Types
//!
//! Errors here are fatal to a provider's whole run. Problems with a single
//! screenshot, playlist entry or game are logged by the provider and never
//! surface as one of these.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A discovery error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The provider has no known location on this operating system.
    #[display("provider does not support this platform: {_0}")]
    UnsupportedPlatform(#[error(not(source))] &'static str),
    /// Home-relative default locations can't be resolved.
    #[display("no home directory found")]
    NoHomeDirectory,
    /// The provider scans an explicit directory and none was given.
    #[display("provider requires an input path")]
    MissingInputPath,
    /// The provider's root directory could not be read.
    #[display("could not read input path: {}", _0.display())]
    InputPath(#[error(not(source))] PathBuf),
    /// A file's metadata could not be read while deriving its name.
    #[display("could not read file metadata: {}", _0.display())]
    Metadata(#[error(not(source))] PathBuf),
    /// A timestamp could not be formatted into a file name.
    #[display("could not format timestamp")]
    Format,
    /// The discovery task panicked or was cancelled.
    #[display("discovery task did not complete")]
    Task,
}
