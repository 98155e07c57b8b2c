pub mod backend;
pub mod error;
mod hash;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::hash::{ContentHash, hash_file};
pub use crate::path::validate as validate_path;
pub use crate::path::validate_segment;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
