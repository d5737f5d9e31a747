// GitHub API module.
// Provides the versioned query builder, transport and wire types for the search API.

pub mod client;
pub mod query;
pub mod types;
pub mod version;

pub use client::{GitHubClient, Transport, fetch_json};
pub use query::{QueryBuilder, SEARCH_REPOSITORIES_PATH, UpstreamRequest};
pub use types::*;
pub use version::{ApiVersion, VersionProfile};
