//! Integration tests for error types

#[cfg(test)]
mod tests {
    use grab_errors::*;

    #[test]
    fn test_error_conversion() {
        let net_err = NetworkError::Timeout {
            url: "https://example.com".into(),
        };
        let err: Error = net_err.into();
        assert!(matches!(err, Error::Network(_)));
    }

    #[test]
    fn test_digest_mismatch_display() {
        let err = DigestError::Mismatch {
            path: "/tmp/grab-cache/x.zip".into(),
            expected: "AA".into(),
            actual: "BB".into(),
        };
        assert_eq!(err.to_string(), "SHA256 mismatch. Actual: BB, expected: AA");

        let err: Error = err.into();
        assert!(err.is_digest_mismatch());
        assert_eq!(err.user_code(), Some("digest.mismatch"));
    }

    #[test]
    fn test_error_clone() {
        let err = ArchiveError::ExtractionFailed {
            archive: "a.zip".into(),
            message: "bad header".into(),
        };
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }

    #[test]
    fn test_io_error_becomes_storage_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "test");
        let err: Error = io_err.into();
        assert!(matches!(
            err,
            Error::Storage(StorageError::PermissionDenied { .. })
        ));
    }

    #[test]
    fn test_io_error_with_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error =
            StorageError::from_io_with_path(&io_err, std::path::Path::new("/tmp/missing")).into();
        match err {
            Error::Storage(StorageError::PathNotFound { path }) => {
                assert_eq!(path, "/tmp/missing");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_retryable_classification() {
        let err: Error = NetworkError::HttpError {
            status: 503,
            message: "Service Unavailable".into(),
        }
        .into();
        assert!(err.is_retryable());

        let err: Error = NetworkError::HttpError {
            status: 404,
            message: "Not Found".into(),
        }
        .into();
        assert!(!err.is_retryable());
        assert!(err.user_hint().is_some());
    }
}
