// Response envelopes for the search endpoint.
// Paginated success bodies, error bodies, and page links derived from the inbound URL.

use axum::Json;
use axum::http::{HeaderMap, StatusCode, Uri, header::HOST};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::error::ProxyError;
use crate::model::{Nullable, Repository, SearchResult};

const PAGE_PARAM: &str = "page";

/// Inbound request URL with its query parameters in canonical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundUrl {
    scheme: String,
    host: String,
    path: String,
    params: Vec<(String, String)>,
}

impl InboundUrl {
    pub fn new(scheme: &str, host: &str, path: &str, query: Option<&str>) -> Self {
        let mut params: Vec<(String, String)> = query
            .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        // Stable sort: equivalent requests share a cache key, repeated keys keep their order.
        params.sort_by(|a, b| a.0.cmp(&b.0));

        Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            path: path.to_string(),
            params,
        }
    }

    /// Reconstruct the URL a client used from the request line and headers.
    pub fn from_parts(headers: &HeaderMap, uri: &Uri) -> Self {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

        let scheme = header("x-forwarded-proto")
            .or_else(|| uri.scheme_str())
            .unwrap_or("http");
        let host = uri
            .authority()
            .map(|a| a.as_str())
            .or_else(|| header(HOST.as_str()))
            .unwrap_or("localhost");

        Self::new(scheme, host, uri.path(), uri.query())
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// First value of a query parameter.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn full_url(&self) -> String {
        self.render(&self.params)
    }

    /// Same URL with `page` set to the page after `page`.
    pub fn next_url(&self, page: u64) -> String {
        self.with_page(page.saturating_add(1))
    }

    /// Same URL with `page` decremented. Null when the request had no page.
    pub fn previous_url(&self, page: u64) -> Nullable<String> {
        if self.get(PAGE_PARAM).is_none() {
            return Nullable::null();
        }
        Nullable::some(self.with_page(page.saturating_sub(1)))
    }

    fn with_page(&self, page: u64) -> String {
        let mut params: Vec<(String, String)> = self
            .params
            .iter()
            .filter(|(k, _)| k != PAGE_PARAM)
            .cloned()
            .collect();
        params.push((PAGE_PARAM.to_string(), page.to_string()));
        params.sort_by(|a, b| a.0.cmp(&b.0));
        self.render(&params)
    }

    fn render(&self, params: &[(String, String)]) -> String {
        let mut url = format!("{}://{}{}", self.scheme, self.host, self.path);
        if !params.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(params)
                .finish();
            url.push('?');
            url.push_str(&query);
        }
        url
    }
}

/// Paginated success body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEnvelope {
    pub total_count: u64,
    pub count: usize,
    pub content: Vec<Repository>,
    pub incomplete_result: bool,
    pub page: u64,
    pub previous: Nullable<String>,
    pub next: String,
}

impl ListEnvelope {
    /// `page` is the validated page the search ran with; links are derived from it.
    pub fn from_result(result: SearchResult, page: u64, inbound: &InboundUrl) -> Self {
        Self {
            total_count: result.total,
            count: result.repositories.len(),
            content: result.repositories,
            incomplete_result: result.incomplete_result,
            page,
            previous: inbound.previous_url(page),
            next: inbound.next_url(page),
        }
    }
}

impl IntoResponse for ListEnvelope {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Error body: the HTTP status and one reason per problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub status: u16,
    pub reasons: Vec<String>,
}

impl ErrorEnvelope {
    pub fn new(status: StatusCode, reasons: Vec<String>) -> Self {
        Self {
            status: status.as_u16(),
            reasons,
        }
    }

    pub fn from_error(error: &ProxyError) -> Self {
        Self::new(error.status(), vec![error.to_string()])
    }
}

impl IntoResponse for ErrorEnvelope {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
