#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for grab
//!
//! This crate handles HTTP transfers: a pooled client and a streaming
//! download that reports progress through events and hashes the body as it
//! is written.

mod client;
mod download;

pub use client::{NetClient, NetConfig};
pub use download::{validate_url, Download, DownloadResult};

use grab_errors::Error;
use grab_events::EventEmitter;
use std::path::Path;

/// Download a file with progress reporting
///
/// # Errors
///
/// Returns an error if the URL is invalid, the download fails, or there are
/// I/O errors while writing the file.
pub async fn download_file<E>(
    client: &NetClient,
    url: &str,
    dest: &Path,
    events: &E,
) -> Result<DownloadResult, Error>
where
    E: EventEmitter + ?Sized,
{
    let download = Download::new(url)?;
    download.execute(client, dest, events).await
}
