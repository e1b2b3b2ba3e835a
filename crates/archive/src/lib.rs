#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Lazy zip extraction for grab
//!
//! An archive is extracted next to itself, into its containing directory,
//! and only when the path the caller needs is not already there. Extracted
//! content is never re-validated; its presence is the whole cache check.

mod unzip;

use grab_errors::{ArchiveError, Error, StorageError};
use grab_events::{AppEvent, EventEmitter, EventSender, ExtractEvent, FailureContext};
use std::path::{Component, Path, PathBuf};

/// Extracts archives into their own directory on demand
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    tx: Option<EventSender>,
}

impl EventEmitter for Extractor {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl Extractor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report extraction events on `tx`
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Make `selected` available next to `archive_path`
    ///
    /// Returns `<archive dir>/<selected>`. If that path already exists, as a
    /// file or a directory, the archive is not opened. Otherwise the whole
    /// archive is extracted into its directory. The returned path is not
    /// re-checked, so an archive lacking `selected` yields a path that does
    /// not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if `selected` is not a relative path inside the
    /// archive directory, if its existence cannot be determined, or if the
    /// archive cannot be opened or decompressed.
    pub async fn extract(&self, archive_path: &Path, selected: &str) -> Result<PathBuf, Error> {
        let extraction_dir = archive_path
            .parent()
            .ok_or_else(|| ArchiveError::NoParentDirectory {
                archive: archive_path.display().to_string(),
            })?
            .to_path_buf();

        validate_selected(selected)?;
        let resolved = extraction_dir.join(selected);
        let correlation = archive_path.display().to_string();

        let exists = tokio::fs::try_exists(&resolved)
            .await
            .map_err(|e| StorageError::from_io_with_path(&e, &resolved))?;
        if exists {
            self.emit_correlated(
                &correlation,
                AppEvent::Extract(ExtractEvent::CacheHit {
                    path: resolved.clone(),
                }),
            );
            return Ok(resolved);
        }

        self.emit_correlated(
            &correlation,
            AppEvent::Extract(ExtractEvent::Started {
                archive: archive_path.to_path_buf(),
                destination: extraction_dir.clone(),
            }),
        );

        match self.extract_all(archive_path, &extraction_dir).await {
            Ok(entries) => {
                self.emit_correlated(
                    &correlation,
                    AppEvent::Extract(ExtractEvent::Completed {
                        archive: archive_path.to_path_buf(),
                        destination: extraction_dir,
                        entries,
                    }),
                );
                Ok(resolved)
            }
            Err(e) => {
                self.emit_correlated(
                    &correlation,
                    AppEvent::Extract(ExtractEvent::Failed {
                        archive: archive_path.to_path_buf(),
                        failure: FailureContext::from_error(&e),
                    }),
                );
                Err(e)
            }
        }
    }

    async fn extract_all(&self, archive_path: &Path, dest_dir: &Path) -> Result<usize, Error> {
        let archive = archive_path.to_path_buf();
        let dest = dest_dir.to_path_buf();

        tokio::task::spawn_blocking(move || unzip::extract_all(&archive, &dest))
            .await
            .map_err(|e| {
                ArchiveError::extraction_failed(archive_path, format!("task join error: {e}"))
            })?
    }
}

/// Extract `selected` from `archive_path` without event reporting
///
/// # Errors
///
/// See [`Extractor::extract`].
pub async fn extract(archive_path: &Path, selected: &str) -> Result<PathBuf, Error> {
    Extractor::new().extract(archive_path, selected).await
}

fn validate_selected(selected: &str) -> Result<(), Error> {
    let path = Path::new(selected);
    let plain = path
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if selected.is_empty() || !plain {
        return Err(StorageError::InvalidPath {
            path: selected.to_string(),
        }
        .into());
    }
    Ok(())
}
