//! Key/value cache used by providers to avoid re-fetching remote metadata.
//!
//! Providers that need a remote catalog (Steam's app list, the Nintendo Switch
//! title list) look it up here first and only hit the network on a miss. The
//! cache is never the source of truth: deleting it only costs a download.
//!
//! Two implementations are provided:
//! - [`MemoryCache`]: process-local map, no expiry.
//! - [`FileCache`]: one file per key, freshness tracked by file modification
//!   time.

pub mod error;
mod file;
mod memory;

pub use crate::file::FileCache;
pub use crate::memory::MemoryCache;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub type CacheHandle = Arc<dyn Cache + Send + Sync>;

/// Unified interface for cache implementations.
///
/// All implementations must be safe to share between tasks; providers look
/// up catalogs from background tasks while discovery runs.
///
/// # Examples
///
/// ```
/// use gsm_cache::{Cache, MemoryCache, error::Result};
/// use std::time::Duration;
///
/// async fn cached_or(cache: &dyn Cache, key: &str) -> Result<String> {
///     match cache.get_expiry(key, Duration::from_secs(3600)).await {
///         Ok(value) => Ok(value),
///         Err(e) if e.is_miss() => {
///             let value = "fetched from somewhere".to_string();
///             cache.put(key, &value).await?;
///             Ok(value)
///         },
///         Err(e) => Err(e),
///     }
/// }
/// ```
#[async_trait]
pub trait Cache: Send + Sync {
    /// Returns the value stored under `key`.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) on a miss.
    async fn get(&self, key: &str) -> Result<String>;

    /// Returns the value stored under `key` if it is younger than `ttl`.
    ///
    /// Expired entries are evicted and reported as
    /// [`NotFound`](crate::error::ErrorKind::NotFound). Implementations that
    /// don't track age may simply delegate to [`get`](Self::get).
    async fn get_expiry(&self, key: &str, ttl: Duration) -> Result<String>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a key that doesn't exist is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}
