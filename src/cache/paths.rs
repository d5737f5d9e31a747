// Cache path utilities.
// Maps cache keys (request URLs) to entry files under the cache directory.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use sha2::{Digest, Sha256};

/// Get the base cache directory (~/.cache/repolang on Linux).
pub fn cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "repolang").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Default directory holding cached response entries.
pub fn entries_dir() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join("entries"))
}

/// Path of the entry file for a cache key.
///
/// Keys are full URLs, so they are hashed rather than sanitized to keep
/// file names short and collision free.
pub fn entry_path(root: &Path, key: &str) -> PathBuf {
    let digest = Sha256::digest(key.as_bytes());
    root.join(format!("{}.json", hex::encode(digest)))
}
