//! Remote catalogs that map platform ids to game titles.
//!
//! Catalogs are fetched on a background task so the network round trip
//! overlaps with the local directory scan, and handed back through a
//! oneshot channel once the scan needs them.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use gsm_cache::CacheHandle;
use gsm_fetch::HttpClient;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::oneshot;

/// How long a downloaded catalog is reused before it's fetched again.
pub const CATALOG_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Where a catalog lives, both remotely and in the cache.
#[derive(Clone, Copy, Debug)]
pub struct Source {
    pub cache_key: &'static str,
    pub url: &'static str,
}

/// Loads a catalog, from the cache if it holds a fresh copy, otherwise from
/// the network. Freshly downloaded catalogs are only cached once they decode.
pub async fn load<T: DeserializeOwned>(cache: &CacheHandle, http: &HttpClient, source: Source) -> Result<T> {
    let key = source.cache_key;
    match cache.get_expiry(key, CATALOG_TTL).await {
        Ok(text) => {
            tracing::debug!(key, "Catalog cache hit");
            return serde_json::from_str(&text).or_raise(|| ErrorKind::Decode(key.to_string()));
        },
        Err(e) if e.is_miss() => tracing::debug!(key, "Catalog cache miss"),
        Err(e) => return Err(e.raise(ErrorKind::Cache(key.to_string()))),
    }
    tracing::info!(key, url = source.url, "Downloading catalog");
    let text = http.get_text(source.url).await.or_raise(|| ErrorKind::Download(key.to_string()))?;
    let catalog = serde_json::from_str(&text).or_raise(|| ErrorKind::Decode(key.to_string()))?;
    if let Err(e) = cache.put(key, &text).await {
        tracing::warn!(key, error = ?e, "Could not cache catalog");
    }
    Ok(catalog)
}

/// Starts [`load`] on a background task.
pub fn spawn<T>(cache: CacheHandle, http: HttpClient, source: Source) -> oneshot::Receiver<Result<T>>
where
    T: DeserializeOwned + Send + 'static,
{
    let (sender, receiver) = oneshot::channel();
    tokio::spawn(async move {
        // The receiver is dropped when discovery failed early; nothing to do.
        let _ = sender.send(load(&cache, &http, source).await);
    });
    receiver
}

/// Waits for a background catalog, degrading to an empty one on failure.
pub async fn receive<T: Default>(receiver: oneshot::Receiver<Result<T>>, source: Source) -> T {
    match receiver.await {
        Ok(Ok(catalog)) => catalog,
        Ok(Err(e)) => {
            tracing::warn!(key = source.cache_key, error = ?e, "Catalog unavailable, games will be named by id");
            T::default()
        },
        Err(_) => {
            let e = exn::Exn::from(ErrorKind::Task(source.cache_key.to_string()));
            tracing::warn!(key = source.cache_key, error = ?e, "Catalog unavailable, games will be named by id");
            T::default()
        },
    }
}
