// In-process cache store.
// Entries carry their own expiry instant; expired ones are dropped on read and swept on write.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::Result;

use super::CacheStore;

/// Minimum time between two sweeps of expired entries.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Instant,
}

#[derive(Debug)]
struct Entries {
    map: HashMap<String, Entry>,
    last_sweep: Instant,
}

/// Cache store backed by a mutex-guarded map.
#[derive(Debug)]
pub struct MemoryCache {
    entries: Mutex<Entries>,
    sweep_interval: Duration,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::with_sweep_interval(DEFAULT_SWEEP_INTERVAL)
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache whose writes purge expired entries at most once per `interval`.
    pub fn with_sweep_interval(interval: Duration) -> Self {
        Self {
            entries: Mutex::new(Entries {
                map: HashMap::new(),
                last_sweep: Instant::now(),
            }),
            sweep_interval: interval,
        }
    }

    /// Number of entries currently held, expired ones not yet swept included.
    pub fn len(&self) -> usize {
        self.entries.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock();
        match entries.map.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.map.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        if now.duration_since(entries.last_sweep) >= self.sweep_interval {
            let before = entries.map.len();
            entries.map.retain(|_, e| e.expires_at > now);
            entries.last_sweep = now;
            let swept = before - entries.map.len();
            if swept > 0 {
                tracing::debug!(swept, "swept expired cache entries");
            }
        }

        entries.map.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
        Ok(())
    }
}
