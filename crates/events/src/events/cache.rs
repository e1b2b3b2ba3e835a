use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Download cache events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CacheEvent {
    /// Cached file matched the expected digest; no transfer needed
    Hit {
        filename: String,
        path: PathBuf,
        hash: String,
    },

    /// Nothing cached under this name yet
    Miss { filename: String, path: PathBuf },

    /// A cached file exists but hashes to something else; it will be replaced
    Stale {
        filename: String,
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// Freshly downloaded file matched the expected digest
    Verified { path: PathBuf, hash: String },

    /// Freshly downloaded file did not match; it is left on disk
    Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}
