//! Catalog Error Types
//!
//! Remote catalogs only ever improve names; providers log these and carry on
//! with what they found locally.

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not read catalog {_0} from cache")]
    Cache(#[error(not(source))] String),
    #[display("could not download catalog {_0}")]
    Download(#[error(not(source))] String),
    #[display("could not decode catalog {_0}")]
    Decode(#[error(not(source))] String),
    #[display("catalog task for {_0} did not complete")]
    Task(#[error(not(source))] String),
}
