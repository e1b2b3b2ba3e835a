//! CLI error handling

use std::fmt;

use grab_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Error from fetching, extracting or configuration
    Grab(grab_errors::Error),
    /// I/O error
    Io(std::io::Error),
}

impl CliError {
    /// Stable error code, if any
    pub fn code(&self) -> Option<&'static str> {
        match self {
            CliError::Grab(e) => e.user_code(),
            CliError::Io(_) => None,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Grab(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                if e.is_retryable() {
                    write!(f, "\n  Retry: safe to retry this operation.")?;
                }
                Ok(())
            }
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Grab(e) => Some(e),
            CliError::Io(e) => Some(e),
        }
    }
}

impl From<grab_errors::Error> for CliError {
    fn from(e: grab_errors::Error) -> Self {
        CliError::Grab(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grab_errors::DigestError;

    #[test]
    fn test_display_includes_code_and_hint() {
        let err = CliError::from(grab_errors::Error::from(DigestError::Mismatch {
            path: "/tmp/x.zip".to_string(),
            expected: "AA".to_string(),
            actual: "BB".to_string(),
        }));
        let text = err.to_string();
        assert!(text.contains("Actual: BB"));
        assert!(text.contains("Code: digest.mismatch"));
        assert_eq!(err.code(), Some("digest.mismatch"));
    }
}
