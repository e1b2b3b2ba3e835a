//! Configuration sections

use crate::constants::{CACHE_DIR_NAME, DEFAULT_BUFFER_SIZE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Download cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache root; defaults to `<temp dir>/grab-cache`
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl CacheConfig {
    /// Resolved cache root directory
    #[must_use]
    pub fn root(&self) -> PathBuf {
        self.root
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(CACHE_DIR_NAME))
    }
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64, // seconds
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl NetworkConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

// Default value functions for serde
fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

fn default_timeout() -> u64 {
    300 // 5 minutes for large downloads
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("grab/{}", env!("CARGO_PKG_VERSION"))
}
