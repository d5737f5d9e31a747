// Versioned request builder for the GitHub search API.
// Renders validated filters, sort and paging into a deterministic upstream request.

use std::collections::BTreeMap;

use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use url::Url;

use crate::error::{ProxyError, Result};

use super::version::{ApiVersion, VersionProfile};

/// Path of the repository search endpoint, relative to the API base URL.
pub const SEARCH_REPOSITORIES_PATH: &str = "/search/repositories";

const API_VERSION_HEADER: &str = "x-github-api-version";

/// Fully rendered request ready to be handed to a transport.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl UpstreamRequest {
    /// URL identifying this request, used as the cache key.
    pub fn canonical_url(&self) -> &str {
        self.url.as_str()
    }
}

/// Accumulates a validated search query for one API version.
///
/// Filter terms live in a sorted map so that two logically identical
/// queries always render to byte-identical URLs.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    profile: &'static VersionProfile,
    base_url: String,
    authorization: Option<String>,
    filters: BTreeMap<String, String>,
    sort: Option<String>,
    limit: u32,
    page: u64,
}

impl QueryBuilder {
    /// Create a builder for the given API version with its default base URL.
    pub fn new(version: ApiVersion) -> Self {
        let profile = version.profile();
        let filters = profile
            .implicit_filters
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Self {
            profile,
            base_url: profile.base_url.to_string(),
            authorization: None,
            filters,
            sort: None,
            limit: profile.default_limit,
            page: 1,
        }
    }

    /// Create a builder from a version tag, failing if no builder is registered for it.
    pub fn for_version(version: &str) -> Result<Self> {
        Ok(Self::new(version.parse()?))
    }

    /// Point the builder at a different API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn version(&self) -> ApiVersion {
        self.profile.version
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    /// Add a filter term. The key must be allow-listed and the value non-empty.
    pub fn set_filter(&mut self, key: &str, value: &str) -> Result<()> {
        if !self.profile.supported_filters.contains(&key) || value.is_empty() {
            return Err(ProxyError::UnsupportedParameter(key.to_string()));
        }
        self.filters.insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub fn set_sort(&mut self, value: &str) -> Result<()> {
        if !self.profile.supported_sorts.contains(&value) {
            return Err(ProxyError::UnsupportedSort {
                value: value.to_string(),
                allowed: self.profile.supported_sorts.join(","),
            });
        }
        self.sort = Some(value.to_string());
        Ok(())
    }

    pub fn set_limit(&mut self, value: i64) -> Result<()> {
        let max = self.profile.max_limit;
        if value < 1 || value > i64::from(max) {
            return Err(ProxyError::InvalidLimit { value, max });
        }
        self.limit = value as u32;
        Ok(())
    }

    pub fn set_page(&mut self, value: i64) -> Result<()> {
        if value < 1 {
            return Err(ProxyError::InvalidPage(value));
        }
        self.page = value as u64;
        Ok(())
    }

    /// Store a bearer token for header injection. Empty tokens are ignored.
    pub fn set_authorization(&mut self, token: &str) {
        if !token.is_empty() {
            self.authorization = Some(token.to_string());
        }
    }

    /// Render the search request for `relative_path` under the base URL.
    ///
    /// Query parameters are emitted in key order (`page`, `per_page`, `q`,
    /// `sort`) and filter terms in sorted key order, joined by spaces.
    pub fn build(&self, method: Method, relative_path: &str) -> Result<UpstreamRequest> {
        let mut url = parse_url(&join_url(&self.base_url, relative_path))?;

        let terms = self
            .filters
            .iter()
            .map(|(k, v)| format!("{}:{}", k, v))
            .collect::<Vec<_>>()
            .join(" ");

        {
            let mut pairs = url.query_pairs_mut();
            pairs.clear();
            pairs.append_pair("page", &self.page.to_string());
            pairs.append_pair("per_page", &self.limit.to_string());
            if !terms.is_empty() {
                pairs.append_pair("q", &terms);
            }
            if let Some(sort) = &self.sort {
                pairs.append_pair("sort", sort);
            }
        }

        Ok(UpstreamRequest {
            method,
            url,
            headers: self.headers()?,
        })
    }

    /// Render a plain GET for an absolute sub-resource URL returned by the API,
    /// carrying the same version and authorization headers as the search call.
    pub fn resource_request(&self, resource_url: &str) -> Result<UpstreamRequest> {
        Ok(UpstreamRequest {
            method: Method::GET,
            url: parse_url(resource_url)?,
            headers: self.headers()?,
        })
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            API_VERSION_HEADER,
            HeaderValue::from_static(self.profile.version.as_str()),
        );
        if let Some(token) = &self.authorization {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| ProxyError::Other(e.to_string()))?,
            );
        }
        Ok(headers)
    }
}

fn join_url(base: &str, path: &str) -> String {
    if base.is_empty() {
        return path.to_string();
    }
    if path.is_empty() {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| ProxyError::Other(format!("invalid upstream url {}: {}", raw, e)))
}
