use derive_more::{Display, Error};

/// A fetch error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for fetch operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not build HTTP client")]
    Client,
    #[display("request to {_0} failed")]
    Request(#[error(not(source))] String),
    #[display("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },
    #[display("could not read response body from {_0}")]
    Body(#[error(not(source))] String),
    #[display("could not decode response from {_0}")]
    Decode(#[error(not(source))] String),
    #[display("could not write download to a temporary file")]
    TempFile,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// Server errors and dropped connections are worth another go; client
    /// errors (4xx) and undecodable bodies are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(_) | Self::Body(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
