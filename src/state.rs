// Shared application state.
// Wires the transport, cache store and aggregator together from the config.

use std::sync::Arc;

use crate::aggregate::Aggregator;
use crate::cache::{CacheStore, FileCache, MemoryCache, ResponseCache};
use crate::config::{CacheBackend, Config};
use crate::error::Result;
use crate::github::{GitHubClient, Transport};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Cache keyed by inbound request URL.
    pub cache: ResponseCache,
    pub aggregator: Aggregator,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let store: Arc<dyn CacheStore> = match config.cache_backend {
            CacheBackend::Memory => Arc::new(MemoryCache::new()),
            CacheBackend::File => match &config.cache_dir {
                Some(dir) => Arc::new(FileCache::new(dir)),
                None => Arc::new(FileCache::in_default_dir()?),
            },
        };
        let transport: Arc<dyn Transport> = Arc::new(GitHubClient::new()?);

        Ok(Self::with_parts(config, transport, store))
    }

    /// Assemble state around an explicit transport and cache store.
    pub fn with_parts(
        config: Config,
        transport: Arc<dyn Transport>,
        store: Arc<dyn CacheStore>,
    ) -> Self {
        let cache = ResponseCache::new(store, config.cache_ttl);
        let aggregator = Aggregator::new(transport, cache.clone())
            .with_token(config.github_token.clone())
            .with_timeouts(config.request_timeout, config.enrichment_timeout);

        Self {
            config: Arc::new(config),
            cache,
            aggregator,
        }
    }
}
