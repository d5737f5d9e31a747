// GitHub API response types.
// Defines structs for deserializing the repository search and languages endpoints.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response of `GET /search/repositories`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

/// Repository as returned inside a search response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchItem {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: ItemOwner,
    pub description: Option<String>,
    pub html_url: Option<String>,
    pub languages_url: String,
    pub license: Option<ItemLicense>,
    #[serde(default)]
    pub size: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Owner of a search item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemOwner {
    pub login: String,
}

/// License of a search item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemLicense {
    pub key: String,
}

/// Response of a repository `languages_url`: language name to byte count.
pub type Languages = BTreeMap<String, u64>;

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}
