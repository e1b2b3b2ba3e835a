//! A single named file in the download cache

use grab_errors::{Error, StorageError};
use grab_hash::Hash;
use std::path::{Component, Path, PathBuf};

/// What a lookup found at an entry's path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheState {
    /// File present and its digest matches
    Valid,
    /// No regular file at the path
    Missing,
    /// File present with a different digest
    Stale { actual: Hash },
}

/// A cache file identified by name, with the digest it must have
#[derive(Debug, Clone)]
pub struct CacheEntry {
    filename: String,
    path: PathBuf,
    expected: Hash,
}

impl CacheEntry {
    /// Resolve `filename` under `cache_root`
    ///
    /// # Errors
    ///
    /// Returns an error if `filename` is empty or is not a single plain path
    /// component.
    pub fn new(cache_root: &Path, filename: &str, expected: Hash) -> Result<Self, Error> {
        validate_filename(filename)?;
        Ok(Self {
            filename: filename.to_string(),
            path: cache_root.join(filename),
            expected,
        })
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn expected(&self) -> &Hash {
        &self.expected
    }

    /// Digest of the file on disk, or `None` if there is no regular file
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub async fn computed_digest(&self, buffer_size: usize) -> Result<Option<Hash>, Error> {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::from_io_with_path(&e, &self.path).into()),
        }

        Hash::hash_file_with_buffer(&self.path, buffer_size)
            .await
            .map(Some)
    }

    /// Check the file on disk against the expected digest
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub async fn lookup(&self, buffer_size: usize) -> Result<CacheState, Error> {
        Ok(match self.computed_digest(buffer_size).await? {
            None => CacheState::Missing,
            Some(actual) if actual == self.expected => CacheState::Valid,
            Some(actual) => CacheState::Stale { actual },
        })
    }
}

fn validate_filename(filename: &str) -> Result<(), Error> {
    let mut components = Path::new(filename).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(StorageError::InvalidPath {
            path: filename.to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_rejects_non_plain_names() {
        let root = Path::new("/tmp/grab-cache");
        let expected = Hash::from_data(b"");
        for name in ["", "..", "a/b", "/etc/passwd", "."] {
            assert!(
                CacheEntry::new(root, name, expected).is_err(),
                "{name:?} should be rejected"
            );
        }
        let entry = CacheEntry::new(root, "x.zip", expected).unwrap();
        assert_eq!(entry.path(), Path::new("/tmp/grab-cache/x.zip"));
        assert_eq!(entry.filename(), "x.zip");
    }

    #[tokio::test]
    async fn test_lookup_states() {
        let dir = tempdir().unwrap();
        let expected = Hash::from_data(b"payload");
        let entry = CacheEntry::new(dir.path(), "x.zip", expected).unwrap();

        assert_eq!(entry.lookup(4096).await.unwrap(), CacheState::Missing);

        tokio::fs::write(entry.path(), b"garbage").await.unwrap();
        assert_eq!(
            entry.lookup(4096).await.unwrap(),
            CacheState::Stale {
                actual: Hash::from_data(b"garbage")
            }
        );

        tokio::fs::write(entry.path(), b"payload").await.unwrap();
        assert_eq!(entry.lookup(4096).await.unwrap(), CacheState::Valid);
    }

    #[tokio::test]
    async fn test_directory_counts_as_missing() {
        let dir = tempdir().unwrap();
        let entry = CacheEntry::new(dir.path(), "sub", Hash::from_data(b"")).unwrap();
        tokio::fs::create_dir(entry.path()).await.unwrap();
        assert_eq!(entry.computed_digest(4096).await.unwrap(), None);
    }
}
