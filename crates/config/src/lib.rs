#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for grab
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/grab/config.toml)
//! - Environment variables
//! - CLI flags (applied by the binary)

pub mod constants;
mod sections;

pub use sections::{CacheConfig, NetworkConfig};

use constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use grab_errors::{ConfigError, Error, StorageError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub network: NetworkConfig,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the file does not exist, a storage
    /// error if it exists but cannot be read, and [`ConfigError::ParseError`]
    /// for invalid TOML.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path).await.map_err(|e| -> Error {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.display().to_string(),
                }
                .into()
            } else {
                StorageError::from_io_with_path(&e, path).into()
            }
        })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = match Self::default_path() {
            Ok(path) => path,
            Err(_) => {
                tracing::debug!("no user config directory, using defaults");
                return Ok(Self::default());
            }
        };

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        self.merge_vars(|name| std::env::var(name).ok())
    }

    /// Merge overrides from a variable lookup (`GRAB_*` names)
    fn merge_vars<F>(&mut self, lookup: F) -> Result<(), Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        // GRAB_CACHE_DIR
        if let Some(dir) = lookup("GRAB_CACHE_DIR") {
            if dir.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "GRAB_CACHE_DIR".to_string(),
                    value: dir,
                }
                .into());
            }
            self.cache.root = Some(PathBuf::from(dir));
        }

        // GRAB_TIMEOUT
        if let Some(timeout) = lookup("GRAB_TIMEOUT") {
            self.network.timeout = timeout.parse().map_err(|_| ConfigError::InvalidValue {
                field: "GRAB_TIMEOUT".to_string(),
                value: timeout,
            })?;
        }

        // GRAB_CONNECT_TIMEOUT
        if let Some(timeout) = lookup("GRAB_CONNECT_TIMEOUT") {
            self.network.connect_timeout =
                timeout.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "GRAB_CONNECT_TIMEOUT".to_string(),
                    value: timeout,
                })?;
        }

        Ok(())
    }

    /// Get the cache root (with default)
    #[must_use]
    pub fn cache_root(&self) -> PathBuf {
        self.cache.root()
    }
}
