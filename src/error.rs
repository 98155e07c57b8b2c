//! Top-level error types for the `gsm` binary.

use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("invalid log level: {_0}")]
    LogLevel(#[error(not(source))] String),
    #[display("could not set up providers")]
    Registry,
    #[display("unknown provider {name:?}, available: {available}")]
    UnknownProvider { name: String, available: String },
    #[display("provider {_0} failed")]
    Provider(#[error(not(source))] String),
    #[display("unusable output path: {}", _0.display())]
    OutputPath(#[error(not(source))] PathBuf),
    #[display("could not set up HTTP client")]
    Http,
}
