//! Digest-keyed download cache

use crate::entry::{CacheEntry, CacheState};
use grab_config::Config;
use grab_errors::{DigestError, Error, StorageError};
use grab_events::{AppEvent, CacheEvent, EventEmitter, EventSender};
use grab_hash::{Hash, CHUNK_SIZE};
use grab_net::{Download, NetClient, NetConfig};
use std::path::{Path, PathBuf};

/// Downloads files into a flat cache directory, reusing any cached file
/// whose SHA-256 already matches.
#[derive(Debug, Clone)]
pub struct Fetcher {
    cache_root: PathBuf,
    buffer_size: usize,
    client: NetClient,
    tx: Option<EventSender>,
}

impl EventEmitter for Fetcher {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl Fetcher {
    /// Create a fetcher storing files under `cache_root`
    #[must_use]
    pub fn new(cache_root: impl Into<PathBuf>, client: NetClient) -> Self {
        Self {
            cache_root: cache_root.into(),
            buffer_size: CHUNK_SIZE,
            client,
            tx: None,
        }
    }

    /// Create a fetcher from loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let client = NetClient::new(&NetConfig::from(&config.network))?;
        Ok(Self::new(config.cache_root(), client).with_buffer_size(config.cache.buffer_size))
    }

    /// Report cache and transfer events on `tx`
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Read buffer used when hashing files
    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    #[must_use]
    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// Resolve the cache entry for `filename`
    ///
    /// # Errors
    ///
    /// Returns an error if `filename` is not a plain file name.
    pub fn entry(&self, filename: &str, expected: Hash) -> Result<CacheEntry, Error> {
        CacheEntry::new(&self.cache_root, filename, expected)
    }

    /// Fetch `url` into the cache as `filename`, verified against a hex digest
    ///
    /// Returns the cached path without touching the network when a file with
    /// the expected digest is already present.
    ///
    /// # Errors
    ///
    /// Returns a digest error if `expected_digest` is not a SHA-256 hex
    /// string, or any error from [`Fetcher::fetch_hash`].
    pub async fn fetch(
        &self,
        filename: &str,
        url: &str,
        expected_digest: &str,
    ) -> Result<PathBuf, Error> {
        let expected = Hash::from_hex(expected_digest)?;
        self.fetch_hash(filename, url, expected).await
    }

    /// Fetch `url` into the cache as `filename`, verified against `expected`
    ///
    /// # Errors
    ///
    /// - storage errors when the cache root or file cannot be created, read or written
    /// - network errors when the transfer fails (not retried)
    /// - [`DigestError::Mismatch`] when the downloaded bytes hash differently;
    ///   the file stays on disk and will be replaced by the next fetch
    pub async fn fetch_hash(
        &self,
        filename: &str,
        url: &str,
        expected: Hash,
    ) -> Result<PathBuf, Error> {
        let entry = self.entry(filename, expected)?;

        tokio::fs::create_dir_all(&self.cache_root)
            .await
            .map_err(|e| StorageError::from_io_with_path(&e, &self.cache_root))?;

        match entry.lookup(self.buffer_size).await? {
            CacheState::Valid => {
                self.emit_correlated(
                    entry.filename(),
                    AppEvent::Cache(CacheEvent::Hit {
                        filename: entry.filename().to_string(),
                        path: entry.path().to_path_buf(),
                        hash: expected.to_hex(),
                    }),
                );
                return Ok(entry.path().to_path_buf());
            }
            CacheState::Missing => {
                self.emit_correlated(
                    entry.filename(),
                    AppEvent::Cache(CacheEvent::Miss {
                        filename: entry.filename().to_string(),
                        path: entry.path().to_path_buf(),
                    }),
                );
            }
            CacheState::Stale { actual } => {
                self.emit_correlated(
                    entry.filename(),
                    AppEvent::Cache(CacheEvent::Stale {
                        filename: entry.filename().to_string(),
                        path: entry.path().to_path_buf(),
                        expected: expected.to_hex(),
                        actual: actual.to_hex(),
                    }),
                );
            }
        }

        let download = Download::new(url)?;
        let result = download.execute(&self.client, entry.path(), self).await?;

        // The download hashes exactly the bytes it wrote to the entry path
        if result.hash != expected {
            self.emit_correlated(
                entry.filename(),
                AppEvent::Cache(CacheEvent::Mismatch {
                    path: result.path.clone(),
                    expected: expected.to_hex(),
                    actual: result.hash.to_hex(),
                }),
            );
            return Err(DigestError::Mismatch {
                path: result.path.display().to_string(),
                expected: expected.to_hex(),
                actual: result.hash.to_hex(),
            }
            .into());
        }

        self.emit_correlated(
            entry.filename(),
            AppEvent::Cache(CacheEvent::Verified {
                path: result.path.clone(),
                hash: result.hash.to_hex(),
            }),
        );

        Ok(result.path)
    }
}
