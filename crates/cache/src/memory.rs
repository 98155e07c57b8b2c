//! In-memory cache.

use crate::Cache;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

/// Process-local cache.
///
/// Entries live as long as the value does and never expire, which makes this
/// the natural choice for tests and for runs where the user opted out of a
/// persistent cache directory.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, String>>,
}
impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<String> {
        match self.entries.read().await.get(key) {
            Some(value) => Ok(value.clone()),
            None => exn::bail!(ErrorKind::NotFound(key.to_string())),
        }
    }

    async fn get_expiry(&self, key: &str, _ttl: Duration) -> Result<String> {
        self.get(key).await
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let cache = MemoryCache::new();
        let err = cache.get("steam-applist").await.unwrap_err();
        assert!(err.is_miss());

        cache.put("steam-applist", "{}").await.unwrap();
        assert_eq!(cache.get("steam-applist").await.unwrap(), "{}");
        assert_eq!(cache.get_expiry("steam-applist", Duration::ZERO).await.unwrap(), "{}");

        cache.put("steam-applist", "[]").await.unwrap();
        assert_eq!(cache.get("steam-applist").await.unwrap(), "[]");

        cache.delete("steam-applist").await.unwrap();
        cache.delete("steam-applist").await.unwrap();
        assert!(cache.get("steam-applist").await.unwrap_err().is_miss());
    }
}
