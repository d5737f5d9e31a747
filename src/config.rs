// Runtime configuration.
// Read from environment variables with defaults for local development.

use std::path::PathBuf;
use std::time::Duration;

/// Where cached responses are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheBackend {
    #[default]
    Memory,
    File,
}

impl CacheBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(CacheBackend::Memory),
            "file" => Some(CacheBackend::File),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub bind_addr: String,
    /// Bearer token for GitHub API calls
    pub github_token: Option<String>,
    /// GitHub REST API version tag, validated per request
    pub api_version: String,
    /// Override of the version's default API base URL
    pub api_base_url: Option<String>,
    /// Lifetime of every cache entry
    pub cache_ttl: Duration,
    pub cache_backend: CacheBackend,
    /// Directory of the file cache (platform cache dir when unset)
    pub cache_dir: Option<PathBuf>,
    /// Timeout of the primary search call
    pub request_timeout: Duration,
    /// Timeout of each per-repository language lookup
    pub enrichment_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            github_token: None,
            api_version: "2022-11-28".to_string(),
            api_base_url: None,
            cache_ttl: Duration::from_secs(5 * 60),
            cache_backend: CacheBackend::Memory,
            cache_dir: None,
            request_timeout: Duration::from_secs(30),
            enrichment_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(port) = var("PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.bind_addr = format!("0.0.0.0:{}", port);
            }
        }
        if let Some(addr) = var("BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(token) = var("GITHUB_TOKEN") {
            if !token.is_empty() {
                config.github_token = Some(token);
            }
        }
        if let Some(version) = var("GITHUB_API_VERSION") {
            config.api_version = version;
        }
        if let Some(url) = var("GITHUB_API_BASE_URL") {
            if !url.is_empty() {
                config.api_base_url = Some(url);
            }
        }
        if let Some(val) = var("CACHE_DURATION_IN_MIN") {
            match val.parse::<u64>().ok().and_then(|m| m.checked_mul(60)) {
                Some(secs) => config.cache_ttl = Duration::from_secs(secs),
                None => tracing::warn!("Invalid CACHE_DURATION_IN_MIN {:?}, using default", val),
            }
        }
        if let Some(val) = var("CACHE_BACKEND") {
            match CacheBackend::parse(&val) {
                Some(backend) => config.cache_backend = backend,
                None => tracing::warn!("Unknown CACHE_BACKEND {:?}, using memory", val),
            }
        }
        if let Some(dir) = var("CACHE_DIR") {
            config.cache_dir = Some(PathBuf::from(dir));
        }
        if let Some(val) = var("REQUEST_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                config.request_timeout = Duration::from_secs(v);
            }
        }
        if let Some(val) = var("ENRICHMENT_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                config.enrichment_timeout = Duration::from_secs(v);
            }
        }

        config
    }
}
