//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Games were submitted before [`Processor::start`](crate::Processor::start).
    #[display("processor has not been started")]
    NotStarted,
    /// The processor was cancelled, or has already drained.
    #[display("processor is no longer accepting games")]
    Cancelled,
    /// A game could not be organized at all.
    #[display("could not organize game")]
    Organize,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
