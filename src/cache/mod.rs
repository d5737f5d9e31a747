// Cache module for upstream responses.
// Stores serialized aggregates and language maps keyed by request URL.

pub mod memory;
pub mod paths;
pub mod store;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{ProxyError, Result};

pub use memory::MemoryCache;
pub use store::{CachedData, FileCache};

/// Default TTL for cached responses: 5 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Key-value store of string blobs with per-entry expiry.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read a live entry. `Ok(None)` for absent or expired keys.
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;
}

/// JSON caching layer wrapped around fetches.
///
/// Every cache failure is logged and swallowed: a broken store degrades to
/// a miss on read and a no-op on write.
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Read and decode an entry. Errors mean "absent or corrupt".
    pub async fn get_and_decode<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let raw = self
            .store
            .get(key)
            .await?
            .ok_or_else(|| ProxyError::Cache(format!("no entry for {}", key)))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Encode and store an entry with the configured TTL.
    pub async fn encode_and_set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.store.set(key, raw, self.ttl).await
    }

    /// Serve `key` from cache, or run `fetch` and store its output when `keep` accepts it.
    ///
    /// Fetch errors are returned untouched and never cached.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: &str, keep: fn(&T) -> bool, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match self.get_and_decode::<T>(key).await {
            Ok(value) => {
                tracing::debug!(key, "cache hit");
                return Ok(value);
            }
            Err(e) => tracing::debug!(key, reason = %e, "cache miss"),
        }

        let value = fetch().await?;

        if keep(&value) {
            if let Err(e) = self.encode_and_set(key, &value).await {
                tracing::warn!(key, error = %e, "failed to write cache entry");
            }
        }

        Ok(value)
    }
}
