use serde::{Deserialize, Serialize};

use crate::EventSource;
use grab_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code, when the error carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod cache;
pub mod download;
pub mod extract;
pub mod general;

pub use cache::*;
pub use download::*;
pub use extract::*;
pub use general::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, operations)
    General(GeneralEvent),

    /// HTTP transfer events (start, progress, completion)
    Download(DownloadEvent),

    /// Download cache lookups and digest verification
    Cache(CacheEvent),

    /// Archive extraction events
    Extract(ExtractEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Download(_) => EventSource::DOWNLOAD,
            Self::Cache(_) => EventSource::CACHE,
            Self::Extract(_) => EventSource::EXTRACT,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            // Error-level events
            Self::General(GeneralEvent::Error { .. } | GeneralEvent::OperationFailed { .. })
            | Self::Download(DownloadEvent::Failed { .. })
            | Self::Cache(CacheEvent::Mismatch { .. })
            | Self::Extract(ExtractEvent::Failed { .. }) => Level::ERROR,

            // Warning-level events
            Self::Cache(CacheEvent::Stale { .. }) => Level::WARN,

            // Debug-level events (progress updates, internal state)
            Self::Download(DownloadEvent::Progress { .. })
            | Self::Cache(CacheEvent::Verified { .. }) => Level::DEBUG,

            _ => Level::INFO,
        }
    }

    /// Whether this event reports that cached output was reused
    #[must_use]
    pub fn is_cache_hit(&self) -> bool {
        matches!(
            self,
            Self::Cache(CacheEvent::Hit { .. }) | Self::Extract(ExtractEvent::CacheHit { .. })
        )
    }
}
