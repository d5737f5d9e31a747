// GitHub API HTTP client.
// Executes rendered requests, tracks rate limits, and maps error statuses.

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{
    Client, Response, StatusCode,
    header::{HeaderValue, USER_AGENT},
};
use serde::de::DeserializeOwned;

use crate::error::{ProxyError, Result};

use super::query::UpstreamRequest;
use super::types::RateLimit;

/// Executes an upstream request and returns the raw response body.
///
/// Implementations do not retry. Timeouts and cancellation are applied by
/// the caller around the returned future.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn perform(&self, request: &UpstreamRequest) -> Result<Vec<u8>>;
}

/// Perform a request and decode its JSON body.
pub async fn fetch_json<T: DeserializeOwned>(
    transport: &dyn Transport,
    request: &UpstreamRequest,
) -> Result<T> {
    let body = transport.perform(request).await?;
    Ok(serde_json::from_slice(&body)?)
}

/// GitHub API client with rate limit tracking.
pub struct GitHubClient {
    client: Client,
    rate_limit: Mutex<RateLimit>,
}

impl GitHubClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(ProxyError::Api)?;

        Ok(Self::with_client(client))
    }

    /// Wrap an already configured reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            rate_limit: Mutex::new(RateLimit::default()),
        }
    }

    /// Get the last observed rate limit information.
    pub fn rate_limit(&self) -> RateLimit {
        self.rate_limit.lock().clone()
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&self, response: &Response) {
        let header = |name: &str| -> Option<u64> {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
        };

        let mut rate_limit = self.rate_limit.lock();
        if let Some(limit) = header("x-ratelimit-limit") {
            rate_limit.limit = limit;
        }
        if let Some(remaining) = header("x-ratelimit-remaining") {
            rate_limit.remaining = remaining;
            if remaining < 10 {
                tracing::warn!(remaining, reset = rate_limit.reset, "GitHub rate limit nearly exhausted");
            }
        }
        if let Some(reset) = header("x-ratelimit-reset") {
            rate_limit.reset = reset;
        }
    }

    /// Check response status and convert errors.
    async fn check_response(&self, response: Response) -> Result<Response> {
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED => Err(ProxyError::Unauthorized),
            StatusCode::NOT_FOUND => {
                let url = response.url().to_string();
                Err(ProxyError::NotFound(url))
            }
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
                if self.rate_limit.lock().remaining == 0 =>
            {
                let reset = self.rate_limit.lock().reset;
                let reset_at = chrono::DateTime::from_timestamp(reset as i64, 0)
                    .map(|dt| dt.format("%H:%M:%S").to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                Err(ProxyError::RateLimited { reset_at })
            }
            status => Err(ProxyError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }
}

#[async_trait]
impl Transport for GitHubClient {
    async fn perform(&self, request: &UpstreamRequest) -> Result<Vec<u8>> {
        tracing::debug!(method = %request.method, url = %request.url, "upstream request");

        let mut headers = request.headers.clone();
        headers
            .entry(USER_AGENT)
            .or_insert(HeaderValue::from_static(concat!("repolang/", env!("CARGO_PKG_VERSION"))));

        let response = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(headers)
            .send()
            .await?;

        self.update_rate_limit(&response);
        let response = self.check_response(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
