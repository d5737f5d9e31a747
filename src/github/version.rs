// Supported GitHub REST API versions.
// Each version owns a profile describing its endpoint, allow-lists and paging bounds.

use std::fmt;
use std::str::FromStr;

use crate::error::ProxyError;

/// GitHub REST API version the proxy can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    V2022_11_28,
}

/// Static description of what a given API version accepts.
#[derive(Debug)]
pub struct VersionProfile {
    pub version: ApiVersion,
    pub base_url: &'static str,
    pub supported_filters: &'static [&'static str],
    pub supported_sorts: &'static [&'static str],
    /// Filter terms always present in the search query.
    pub implicit_filters: &'static [(&'static str, &'static str)],
    pub max_limit: u32,
    pub default_limit: u32,
}

static PROFILE_2022_11_28: VersionProfile = VersionProfile {
    version: ApiVersion::V2022_11_28,
    base_url: "https://api.github.com",
    supported_filters: &["language", "license", "user", "org", "repo"],
    supported_sorts: &["updated", "forks", "stars"],
    implicit_filters: &[("is", "public")],
    max_limit: 100,
    default_limit: 100,
};

impl ApiVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V2022_11_28 => "2022-11-28",
        }
    }

    pub fn profile(&self) -> &'static VersionProfile {
        match self {
            ApiVersion::V2022_11_28 => &PROFILE_2022_11_28,
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "2022-11-28" => Ok(ApiVersion::V2022_11_28),
            other => Err(ProxyError::UnsupportedApiVersion(other.to_string())),
        }
    }
}
