//! Archive extraction error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ArchiveError {
    #[error("failed to extract {archive}: {message}")]
    ExtractionFailed { archive: String, message: String },

    #[error("archive has no parent directory: {archive}")]
    NoParentDirectory { archive: String },
}

impl ArchiveError {
    /// Build an extraction failure for the given archive
    #[must_use]
    pub fn extraction_failed(archive: &std::path::Path, message: impl Into<String>) -> Self {
        Self::ExtractionFailed {
            archive: archive.display().to_string(),
            message: message.into(),
        }
    }
}

impl UserFacingError for ArchiveError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::ExtractionFailed { .. } => {
                Some("The archive may be corrupt; delete it from the cache and fetch again.")
            }
            Self::NoParentDirectory { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::ExtractionFailed { .. } => "archive.extraction_failed",
            Self::NoParentDirectory { .. } => "archive.no_parent_directory",
        };
        Some(code)
    }
}
