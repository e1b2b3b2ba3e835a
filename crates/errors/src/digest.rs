//! Digest parsing and verification errors

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum DigestError {
    /// Downloaded content does not hash to the expected value. The file is
    /// left in place; the next fetch re-detects the mismatch.
    #[error("SHA256 mismatch. Actual: {actual}, expected: {expected}")]
    Mismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("invalid hex digest {value:?}: {reason}")]
    InvalidHex { value: String, reason: String },

    #[error("digest must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

impl UserFacingError for DigestError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Mismatch { .. } => Some(
                "The server returned different content than expected; verify the URL and digest.",
            ),
            Self::InvalidHex { .. } | Self::InvalidLength { .. } => {
                Some("Pass the SHA-256 digest as 64 hexadecimal characters.")
            }
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::Mismatch { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Mismatch { .. } => "digest.mismatch",
            Self::InvalidHex { .. } => "digest.invalid_hex",
            Self::InvalidLength { .. } => "digest.invalid_length",
        };
        Some(code)
    }
}
