use crate::error::{ErrorKind, Result};
use crate::models::Game;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use time::UtcOffset;

pub type ProviderHandle = Arc<dyn Provider + Send + Sync>;

/// Options shared by every provider.
#[derive(Clone, Debug)]
pub struct ProviderOptions {
    /// Directory to scan. Providers that locate their data through OS
    /// conventions treat this as an override or ignore it.
    pub input_path: Option<PathBuf>,
    /// Offset used when a provider derives names from file modification
    /// times.
    pub utc_offset: UtcOffset,
}
impl Default for ProviderOptions {
    fn default() -> Self {
        Self { input_path: None, utc_offset: UtcOffset::UTC }
    }
}
impl ProviderOptions {
    pub fn new(input_path: Option<PathBuf>) -> Self {
        Self { input_path, ..Self::default() }
    }

    pub fn with_utc_offset(mut self, offset: UtcOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    /// The input path, for providers that can't work without one.
    pub fn require_input_path(&self) -> Result<&Path> {
        match self.input_path.as_deref() {
            Some(path) => Ok(path),
            None => exn::bail!(ErrorKind::MissingInputPath),
        }
    }
}

/// A discovery adapter for one platform's screenshot storage convention.
///
/// # Contract
/// - Runs to completion and returns every game it found; there is no
///   streaming.
/// - Returns an error only when nothing can be enumerated at all (unsupported
///   OS, unreadable root). A single unreadable or unparseable item is logged
///   and skipped.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Registry name, e.g. `steam`.
    fn name(&self) -> &str;

    async fn find_games(&self, options: &ProviderOptions) -> Result<Vec<Game>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_input_path() {
        let options = ProviderOptions::default();
        let err = options.require_input_path().unwrap_err();
        assert!(matches!(&*err, ErrorKind::MissingInputPath));

        let options = ProviderOptions::new(Some(PathBuf::from("/captures")));
        assert_eq!(options.require_input_path().unwrap(), Path::new("/captures"));
    }
}
