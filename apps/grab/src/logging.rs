//! Structured logging integration for events
//!
//! Converts domain events into tracing records with structured fields so
//! that `--debug` and `--json` runs carry the full event stream.

use grab_events::{AppEvent, CacheEvent, DownloadEvent, EventMessage, ExtractEvent, GeneralEvent};
use tracing::{debug, error, info, trace, warn};

/// Log an event at its level with structured fields
pub fn log_event_with_tracing(message: &EventMessage) {
    let event = &message.event;
    let meta = &message.meta;
    let level = meta.tracing_level();

    match event {
        AppEvent::Download(download_event) => match download_event {
            DownloadEvent::Started { url, total_bytes } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    url = %url,
                    total_bytes = ?total_bytes,
                    "Download started"
                );
            }
            DownloadEvent::Progress {
                url,
                bytes_downloaded,
                total_bytes,
            } => {
                trace!(
                    source = meta.source.as_str(),
                    url = %url,
                    bytes_downloaded = bytes_downloaded,
                    total_bytes = ?total_bytes,
                    "Download progress"
                );
            }
            DownloadEvent::Completed {
                url,
                bytes_downloaded,
                hash,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    url = %url,
                    bytes_downloaded = bytes_downloaded,
                    hash = %hash,
                    "Download completed"
                );
            }
            DownloadEvent::Failed { url, failure } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    url = %url,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Download failed"
                );
            }
        },

        AppEvent::Cache(cache_event) => match cache_event {
            CacheEvent::Hit {
                filename,
                path,
                hash,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    filename = %filename,
                    path = %path.display(),
                    hash = %hash,
                    "Cache hit"
                );
            }
            CacheEvent::Stale {
                filename,
                path,
                expected,
                actual,
            } => {
                warn!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    filename = %filename,
                    path = %path.display(),
                    expected = %expected,
                    actual = %actual,
                    "Cached file has wrong digest, downloading again"
                );
            }
            CacheEvent::Mismatch {
                path,
                expected,
                actual,
            } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    path = %path.display(),
                    expected = %expected,
                    actual = %actual,
                    "Downloaded file failed verification"
                );
            }
            other => {
                debug!(source = meta.source.as_str(), event_id = %meta.event_id, correlation = ?meta.correlation_id, event = ?other, "Cache event");
            }
        },

        AppEvent::Extract(extract_event) => match extract_event {
            ExtractEvent::Completed {
                archive,
                destination,
                entries,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    archive = %archive.display(),
                    destination = %destination.display(),
                    entries = entries,
                    "Extraction completed"
                );
            }
            ExtractEvent::Failed { archive, failure } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    archive = %archive.display(),
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Extraction failed"
                );
            }
            other => {
                info!(source = meta.source.as_str(), event_id = %meta.event_id, correlation = ?meta.correlation_id, event = ?other, "Extract event");
            }
        },

        AppEvent::General(general_event) => match general_event {
            GeneralEvent::OperationFailed { operation, failure } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    operation = %operation,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Operation failed"
                );
            }
            GeneralEvent::Error { message, details } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    message = %message,
                    details = ?details,
                    "Error"
                );
            }
            _ => match level {
                tracing::Level::ERROR => {
                    error!(source = meta.source.as_str(), event_id = %meta.event_id, correlation = ?meta.correlation_id, event = ?general_event, "General event");
                }
                tracing::Level::WARN => {
                    warn!(source = meta.source.as_str(), event_id = %meta.event_id, correlation = ?meta.correlation_id, event = ?general_event, "General event");
                }
                tracing::Level::INFO => {
                    info!(source = meta.source.as_str(), event_id = %meta.event_id, correlation = ?meta.correlation_id, event = ?general_event, "General event");
                }
                tracing::Level::DEBUG => {
                    debug!(source = meta.source.as_str(), event_id = %meta.event_id, correlation = ?meta.correlation_id, event = ?general_event, "General event");
                }
                tracing::Level::TRACE => {
                    trace!(source = meta.source.as_str(), event_id = %meta.event_id, correlation = ?meta.correlation_id, event = ?general_event, "General event");
                }
            },
        },
    }
}
