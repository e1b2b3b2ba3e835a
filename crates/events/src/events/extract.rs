use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::FailureContext;

/// Archive extraction events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExtractEvent {
    /// Selected path already exists; the archive was not opened
    CacheHit { path: PathBuf },

    /// Full extraction of the archive is starting
    Started {
        archive: PathBuf,
        destination: PathBuf,
    },

    /// Extraction finished
    Completed {
        archive: PathBuf,
        destination: PathBuf,
        entries: usize,
    },

    /// Extraction aborted
    Failed {
        archive: PathBuf,
        failure: FailureContext,
    },
}
