//! File download with progress reporting and atomic replacement

use futures::StreamExt;
use grab_errors::{Error, NetworkError, StorageError};
use grab_events::{AppEvent, DownloadEvent, EventEmitter, FailureContext};
use grab_hash::Hash;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs::{self as tokio_fs, File};
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::client::{map_reqwest_error, NetClient};

/// Minimum spacing between progress events
const PROGRESS_INTERVAL: Duration = Duration::from_millis(50);

/// Download operation handle
#[derive(Debug, Clone)]
pub struct Download {
    url: Url,
}

/// Result of a download operation
#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub url: String,
    pub path: PathBuf,
    pub size: u64,
    /// Digest of the bytes written to `path`
    pub hash: Hash,
}

/// Removes the temp file unless the download was committed
struct TempFileGuard {
    path: PathBuf,
    committed: bool,
}

impl TempFileGuard {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if !self.committed {
            // Best-effort cleanup - ignore errors
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

impl Download {
    /// Create a new download
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed or does not use http(s).
    pub fn new(url: &str) -> Result<Self, Error> {
        Ok(Self {
            url: validate_url(url)?,
        })
    }

    /// Stream the resource into `dest`, replacing any existing file
    ///
    /// The body is written to a uniquely named sibling file and renamed onto
    /// `dest` only once the transfer has completed, so `dest` never holds a
    /// partial body.
    ///
    /// # Errors
    ///
    /// Returns a network error if the request fails, the server answers with
    /// a non-success status, or the body stream breaks. Returns a storage
    /// error if the file cannot be created, written, or renamed.
    pub async fn execute<E>(
        &self,
        client: &NetClient,
        dest: &Path,
        events: &E,
    ) -> Result<DownloadResult, Error>
    where
        E: EventEmitter + ?Sized,
    {
        let url_str = self.url.to_string();

        match self.transfer(client, &url_str, dest, events).await {
            Ok(result) => {
                events.emit_download_completed(&url_str, result.size, result.hash.to_hex());
                Ok(result)
            }
            Err(e) => {
                events.emit(AppEvent::Download(DownloadEvent::Failed {
                    url: url_str,
                    failure: FailureContext::from_error(&e),
                }));
                Err(e)
            }
        }
    }

    async fn transfer<E>(
        &self,
        client: &NetClient,
        url_str: &str,
        dest: &Path,
        events: &E,
    ) -> Result<DownloadResult, Error>
    where
        E: EventEmitter + ?Sized,
    {
        let response = client.get(url_str).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::HttpError {
                status: status.as_u16(),
                message: status.to_string(),
            }
            .into());
        }

        let content_length = response.content_length();
        events.emit_download_started(url_str, content_length);

        if let Some(parent) = dest.parent() {
            tokio_fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::from_io_with_path(&e, parent))?;
        }

        let temp_path = temp_path_for(dest);
        let guard = TempFileGuard::new(temp_path.clone());
        let mut file = File::create(&temp_path)
            .await
            .map_err(|e| StorageError::from_io_with_path(&e, &temp_path))?;

        let mut stream = response.bytes_stream();
        let mut downloaded = 0u64;
        let mut hasher = Sha256::new();
        let mut last_progress: Option<Instant> = None;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| map_reqwest_error(&e, url_str))?;

            hasher.update(&chunk);
            file.write_all(&chunk)
                .await
                .map_err(|e| StorageError::from_io_with_path(&e, &temp_path))?;

            downloaded += chunk.len() as u64;

            if last_progress.is_none_or(|at| at.elapsed() >= PROGRESS_INTERVAL) {
                events.emit_download_progress(url_str, downloaded, content_length);
                last_progress = Some(Instant::now());
            }
        }

        // Ensure all data is written
        file.flush()
            .await
            .map_err(|e| StorageError::from_io_with_path(&e, &temp_path))?;
        drop(file);

        // Final progress so listeners always see the full byte count
        events.emit_download_progress(url_str, downloaded, content_length);

        tokio_fs::rename(&temp_path, dest)
            .await
            .map_err(|e| StorageError::AtomicRenameFailed {
                message: format!("{} -> {}: {e}", temp_path.display(), dest.display()),
            })?;
        guard.commit();

        Ok(DownloadResult {
            url: url_str.to_string(),
            path: dest.to_path_buf(),
            size: downloaded,
            hash: Hash::from_hasher(hasher),
        })
    }
}

/// Validate URL and check for supported protocols
///
/// # Errors
///
/// Returns an error if the URL is malformed or its scheme is not http(s).
pub fn validate_url(url: &str) -> Result<Url, Error> {
    let parsed = Url::parse(url).map_err(|e| NetworkError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(NetworkError::UnsupportedProtocol {
            protocol: scheme.to_string(),
        }
        .into()),
    }
}

/// Unique sibling path used while the body is in flight
fn temp_path_for(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map_or_else(|| "download".into(), |n| n.to_string_lossy().into_owned());
    dest.with_file_name(format!(
        ".{name}.{}.download",
        uuid::Uuid::new_v4().simple()
    ))
}
