// Repository search handler.
// Validates inbound parameters and serves aggregated results through the response cache.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::api::envelope::{ErrorEnvelope, InboundUrl, ListEnvelope};
use crate::config::Config;
use crate::error::{ProxyError, Result};
use crate::github::QueryBuilder;
use crate::model::SearchResult;
use crate::state::AppState;

/// GET /repos - Search public repositories and attach their language statistics.
///
/// `limit`, `page` and `sort` tune paging and ordering; every other parameter
/// is a search filter. All invalid parameters are reported together.
pub async fn search_repositories(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    if method != Method::GET {
        return ErrorEnvelope::new(
            StatusCode::METHOD_NOT_ALLOWED,
            vec!["GET only endpoint".to_string()],
        )
        .into_response();
    }

    let inbound = InboundUrl::from_parts(&headers, &uri);
    let query = match build_query(&state.config, &inbound) {
        Ok(query) => query,
        Err(envelope) => return envelope.into_response(),
    };
    let page = query.page();

    let aggregator = &state.aggregator;
    let result = state
        .cache
        .get_or_fetch(
            &inbound.full_url(),
            |r: &SearchResult| !r.incomplete_result,
            || aggregator.search(query),
        )
        .await;

    match result {
        Ok(result) => ListEnvelope::from_result(result, page, &inbound).into_response(),
        Err(e) => {
            tracing::error!(url = %inbound.full_url(), error = %e, "repository search failed");
            ErrorEnvelope::from_error(&e).into_response()
        }
    }
}

/// Route inbound parameters through a query builder for the configured API version.
pub fn build_query(
    config: &Config,
    inbound: &InboundUrl,
) -> std::result::Result<QueryBuilder, ErrorEnvelope> {
    let mut query = QueryBuilder::for_version(&config.api_version).map_err(|e| {
        tracing::error!(error = %e, "cannot build upstream query");
        ErrorEnvelope::from_error(&e)
    })?;
    if let Some(base_url) = &config.api_base_url {
        query = query.with_base_url(base_url.as_str());
    }

    let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (key, value) in inbound.params() {
        grouped.entry(key.as_str()).or_default().push(value.as_str());
    }

    let mut reasons = Vec::new();
    for (key, values) in grouped {
        let outcome = match key {
            "limit" => parse_int(key, values[0]).and_then(|n| query.set_limit(n)),
            "page" => parse_int(key, values[0]).and_then(|n| query.set_page(n)),
            "sort" => query.set_sort(values[0]),
            _ => query.set_filter(key, &values.join(" ")),
        };
        if let Err(e) = outcome {
            reasons.push(e.to_string());
        }
    }

    if !reasons.is_empty() {
        tracing::warn!(?reasons, "rejected search parameters");
        return Err(ErrorEnvelope::new(StatusCode::BAD_REQUEST, reasons));
    }
    Ok(query)
}

fn parse_int(name: &str, value: &str) -> Result<i64> {
    value
        .trim()
        .parse()
        .map_err(|_| ProxyError::MalformedParameter(name.to_string()))
}
