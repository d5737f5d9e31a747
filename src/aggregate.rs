// Repository search aggregation.
// Runs the primary search, fans out language lookups, and merges them in upstream order.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;

use crate::cache::ResponseCache;
use crate::error::{ProxyError, Result};
use crate::fanout;
use crate::github::{
    Languages, QueryBuilder, SEARCH_REPOSITORIES_PATH, SearchResponse, Transport, UpstreamRequest,
    fetch_json,
};
use crate::model::{Repository, SearchResult};

/// Default timeout for the primary search call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Default timeout for each language lookup.
pub const DEFAULT_ENRICHMENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Produces enriched search results, caching both the aggregate and each
/// repository's language map.
#[derive(Clone)]
pub struct Aggregator {
    transport: Arc<dyn Transport>,
    cache: ResponseCache,
    token: Option<String>,
    request_timeout: Duration,
    enrichment_timeout: Duration,
}

impl Aggregator {
    pub fn new(transport: Arc<dyn Transport>, cache: ResponseCache) -> Self {
        Self {
            transport,
            cache,
            token: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            enrichment_timeout: DEFAULT_ENRICHMENT_TIMEOUT,
        }
    }

    /// Bearer token injected into every upstream request.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn with_timeouts(mut self, request: Duration, enrichment: Duration) -> Self {
        self.request_timeout = request;
        self.enrichment_timeout = enrichment;
        self
    }

    /// Run `query` against the search endpoint.
    ///
    /// A cached aggregate for the same upstream URL short-circuits all
    /// network calls. Aggregates are cached only when every language lookup
    /// succeeded.
    pub async fn search(&self, mut query: QueryBuilder) -> Result<SearchResult> {
        if let Some(token) = &self.token {
            query.set_authorization(token);
        }
        let request = query.build(Method::GET, SEARCH_REPOSITORIES_PATH)?;
        let key = request.canonical_url().to_string();

        self.cache
            .get_or_fetch(&key, |r: &SearchResult| !r.incomplete_result, || {
                self.fetch(&query, &request)
            })
            .await
    }

    async fn fetch(&self, query: &QueryBuilder, request: &UpstreamRequest) -> Result<SearchResult> {
        tracing::info!(url = %request.url, "searching repositories");

        let response: SearchResponse = tokio::time::timeout(
            self.request_timeout,
            fetch_json(self.transport.as_ref(), request),
        )
        .await
        .map_err(|_| ProxyError::Timeout(self.request_timeout))??;

        let urls = response
            .items
            .iter()
            .map(|item| item.languages_url.clone())
            .collect();
        let outcomes = fanout::map_ordered(urls, self.enrichment_timeout, |url: String| {
            let transport = self.transport.clone();
            let cache = self.cache.clone();
            let request = query.resource_request(&url);
            async move { fetch_languages(transport, cache, request?).await }
        })
        .await;

        let mut failed = 0usize;
        let repositories: Vec<Repository> = response
            .items
            .iter()
            .zip(outcomes)
            .map(|(item, outcome)| {
                let languages = outcome.unwrap_or_else(|e| {
                    tracing::warn!(repository = %item.full_name, error = %e, "language lookup failed");
                    failed += 1;
                    Languages::new()
                });
                Repository::from_item(item, &languages)
            })
            .collect();

        if failed > 0 {
            tracing::warn!(failed, total = repositories.len(), "search result is incomplete");
        }

        Ok(SearchResult {
            repositories,
            total: response.total_count,
            incomplete_result: failed > 0,
        })
    }
}

/// Fetch one repository's language map, served from and stored into the
/// cache under its own URL.
async fn fetch_languages(
    transport: Arc<dyn Transport>,
    cache: ResponseCache,
    request: UpstreamRequest,
) -> Result<Languages> {
    let key = request.canonical_url().to_string();
    cache
        .get_or_fetch(&key, |_| true, || async {
            fetch_json::<Languages>(transport.as_ref(), &request).await
        })
        .await
}
