//! Integration tests for config

#[cfg(test)]
mod tests {
    use grab_config::*;
    use grab_errors::{ConfigError, Error};
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[cache]
root = "/srv/grab"
buffer_size = 131072

[network]
timeout = 45
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.cache_root(), PathBuf::from("/srv/grab"));
        assert_eq!(config.cache.buffer_size, 131_072);
        assert_eq!(config.network.timeout, 45);
        // Unspecified fields keep their defaults
        assert_eq!(config.network.connect_timeout, 30);
    }

    #[tokio::test]
    async fn test_empty_file_uses_defaults() {
        let temp_file = NamedTempFile::new().unwrap();
        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert!(config.cache.root.is_none());
        assert_eq!(config.cache.buffer_size, 64 * 1024);
    }

    #[tokio::test]
    async fn test_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[cache\nroot = ").unwrap();

        let err = Config::load_from_file(temp_file.path()).await.unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::ParseError { .. })));
    }

    #[tokio::test]
    async fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = Config::load_or_default(Some(&missing)).await.unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_unreadable_file_is_not_reported_missing() {
        // A directory exists but cannot be read as a file
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from_file(dir.path()).await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }
}
