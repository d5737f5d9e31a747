// Domain types exposed by the proxy.
// Repositories enriched with language statistics and the aggregate search result.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::github::{Languages, SearchItem};

/// Value that may be explicitly null on the wire, encoded as `{value, is_null}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nullable<T> {
    pub value: T,
    pub is_null: bool,
}

impl<T: Default> Nullable<T> {
    pub fn null() -> Self {
        Self {
            value: T::default(),
            is_null: true,
        }
    }
}

impl<T> Nullable<T> {
    pub fn some(value: T) -> Self {
        Self {
            value,
            is_null: false,
        }
    }
}

impl<T: Default> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Self::null, Self::some)
    }
}

/// Byte count of one language in a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageStats {
    pub bytes: u64,
}

/// Repository search hit enriched with its language breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub full_name: String,
    pub owner: String,
    pub description: Option<String>,
    pub repository: String,
    pub repository_url: String,
    pub languages: BTreeMap<String, LanguageStats>,
    pub license: Nullable<String>,
    pub size: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Repository {
    /// Build a repository from a search item and its language byte counts.
    pub fn from_item(item: &SearchItem, languages: &Languages) -> Self {
        let repository_url = item
            .html_url
            .clone()
            .unwrap_or_else(|| format!("https://github.com/{}", item.full_name));

        Self {
            full_name: item.full_name.clone(),
            owner: item.owner.login.clone(),
            description: item.description.clone(),
            repository: item.name.clone(),
            repository_url,
            languages: languages
                .iter()
                .map(|(name, bytes)| (name.clone(), LanguageStats { bytes: *bytes }))
                .collect(),
            license: item.license.as_ref().map(|l| l.key.clone()).into(),
            size: item.size,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

/// Ordered, enriched page of search results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Repositories in upstream order.
    pub repositories: Vec<Repository>,
    /// Total number of matches reported upstream, not the page length.
    pub total: u64,
    /// Set when at least one language lookup failed.
    pub incomplete_result: bool,
}
