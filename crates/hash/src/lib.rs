#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! SHA-256 content digests for grab
//!
//! This crate provides the single digest algorithm used to key and verify
//! cache entries. Digests render as uppercase hexadecimal and parse from
//! either case.

use grab_errors::{DigestError, Error, StorageError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Size of chunks for streaming hash computation
pub const CHUNK_SIZE: usize = 64 * 1024; // 64KB

/// Length of a SHA-256 digest in bytes
pub const DIGEST_LEN: usize = 32;

/// A SHA-256 hash value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hash {
    bytes: [u8; DIGEST_LEN],
}

impl Hash {
    /// Create a hash from raw bytes
    #[must_use]
    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self { bytes }
    }

    /// Get the raw bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.bytes
    }

    /// Convert to an uppercase hex string
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.bytes)
    }

    /// Parse from a hex string in either case
    ///
    /// # Errors
    /// Returns an error if the input is not valid hexadecimal or does not
    /// decode to exactly 32 bytes.
    pub fn from_hex(s: &str) -> Result<Self, Error> {
        let bytes = hex::decode(s.trim()).map_err(|e| DigestError::InvalidHex {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        let array: [u8; DIGEST_LEN] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| DigestError::InvalidLength {
                    expected: DIGEST_LEN,
                    actual: bytes.len(),
                })?;

        Ok(Self::from_bytes(array))
    }

    /// Compute hash of a byte slice
    #[must_use]
    pub fn from_data(data: &[u8]) -> Self {
        Self::from_hasher(Sha256::new_with_prefix(data))
    }

    /// Finalize an incremental hasher into a `Hash`
    #[must_use]
    pub fn from_hasher(hasher: Sha256) -> Self {
        Self::from_bytes(hasher.finalize().into())
    }

    /// Compute hash of a file
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, read, or if any I/O operation fails.
    pub async fn hash_file(path: &Path) -> Result<Self, Error> {
        Self::hash_file_with_buffer(path, CHUNK_SIZE).await
    }

    /// Compute hash of a file, reading through a buffer of `buffer_size` bytes
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, read, or if any I/O operation fails.
    pub async fn hash_file_with_buffer(path: &Path, buffer_size: usize) -> Result<Self, Error> {
        let mut file = File::open(path)
            .await
            .map_err(|e| StorageError::from_io_with_path(&e, path))?;

        let mut hasher = Sha256::new();
        let mut buffer = vec![0; buffer_size.max(1)];

        loop {
            let n = file
                .read(&mut buffer)
                .await
                .map_err(|e| StorageError::from_io_with_path(&e, path))?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }

        Ok(Self::from_hasher(hasher))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for Hash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Compute the uppercase hex SHA-256 digest of a file
///
/// # Errors
/// Returns an error if the file cannot be opened or read.
pub async fn digest(path: &Path) -> Result<String, Error> {
    Ok(Hash::hash_file(path).await?.to_hex())
}

/// Verify a file matches an expected hash
///
/// # Errors
/// Returns an error if the file cannot be read or hashed.
pub async fn verify_file(path: &Path, expected: &Hash) -> Result<bool, Error> {
    let actual = Hash::hash_file(path).await?;
    Ok(actual == *expected)
}
