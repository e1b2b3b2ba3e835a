use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Download-specific events for the event system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DownloadEvent {
    /// Response headers received, body transfer starting
    Started {
        url: String,
        total_bytes: Option<u64>,
    },

    /// Bytes received so far; `total_bytes` is `None` without a content length
    Progress {
        url: String,
        bytes_downloaded: u64,
        total_bytes: Option<u64>,
    },

    /// Transfer finished and the body is on disk
    Completed {
        url: String,
        bytes_downloaded: u64,
        hash: String,
    },

    /// Transfer aborted
    Failed {
        url: String,
        failure: FailureContext,
    },
}
