// File-backed cache store.
// One JSON file per entry with TTL metadata, written atomically.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{ProxyError, Result};

use super::CacheStore;
use super::paths::{entries_dir, entry_path};

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Cached payload with the metadata needed to expire it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData {
    /// Key the entry was stored under.
    pub key: String,
    /// Serialized payload.
    pub data: String,
    /// When the data was cached.
    pub cached_at: DateTime<Utc>,
    /// Lifetime of the entry in seconds.
    pub ttl_secs: u64,
}

impl CachedData {
    pub fn new(key: &str, data: String, ttl: Duration) -> Self {
        Self {
            key: key.to_string(),
            data,
            cached_at: Utc::now(),
            ttl_secs: ttl.as_secs(),
        }
    }

    /// Check if this cached data has expired.
    pub fn is_expired(&self) -> bool {
        let elapsed = Utc::now()
            .signed_duration_since(self.cached_at)
            .to_std()
            .unwrap_or(Duration::ZERO);

        elapsed >= Duration::from_secs(self.ttl_secs)
    }
}

/// Cache store keeping entries as files in a directory.
#[derive(Debug, Clone)]
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// File cache under the platform cache directory.
    pub fn in_default_dir() -> Result<Self> {
        entries_dir()
            .map(Self::new)
            .ok_or_else(|| ProxyError::Cache("no cache directory available".to_string()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read_entry(&self, path: &Path) -> Result<Option<CachedData>> {
        let contents = match fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&contents)?))
    }
}

#[async_trait]
impl CacheStore for FileCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = entry_path(&self.root, key);
        match self.read_entry(&path).await? {
            Some(entry) if entry.key == key && !entry.is_expired() => Ok(Some(entry.data)),
            Some(entry) if entry.is_expired() => {
                let _ = fs::remove_file(&path).await;
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        fs::create_dir_all(&self.root).await?;

        let path = entry_path(&self.root, key);
        let json = serde_json::to_string(&CachedData::new(key, value, ttl))?;

        // Write atomically via a temp file unique to this write
        let temp_path = temp_path_for(&path);
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
        fs::rename(&temp_path, &path).await?;

        Ok(())
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
    path.with_extension(format!("{}.{}.tmp", std::process::id(), seq))
}
