#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Integrity-verified download cache for grab
//!
//! Files are stored flat under a cache root by caller-chosen name. A fetch
//! is a cache hit when a file with that name already hashes to the expected
//! SHA-256; otherwise the resource is downloaded, replacing whatever was
//! there, and verified before the path is handed back.

mod entry;
mod fetcher;

pub use entry::{CacheEntry, CacheState};
pub use fetcher::Fetcher;
