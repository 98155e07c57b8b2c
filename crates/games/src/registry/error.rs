use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("provider already registered: {_0}")]
    AlreadyRegistered(#[error(not(source))] String),
    #[display("provider not registered: {_0}")]
    NotRegistered(#[error(not(source))] String),
}
