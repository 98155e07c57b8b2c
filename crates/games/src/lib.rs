//! Discovery side of the screenshot manager.
//!
//! - [`Game`] and [`Screenshot`]: what providers hand to the library.
//! - [`Provider`]: the contract every platform adapter implements.
//! - [`Registry`](registry::Registry): resolves a provider by name.

mod collect;
pub mod error;
mod models;
mod provider;
pub mod registry;

pub use crate::collect::GameSet;
pub use crate::models::{DATETIME_FORMAT, Game, Screenshot, extension_of, format_datetime, format_modified};
pub use crate::provider::{Provider, ProviderHandle, ProviderOptions};
pub use crate::registry::Registry;
