//! Host download facility interface
//!
//! The host owns the actual download machinery (save dialogs, file writes,
//! download history). This crate only talks to it through [`DownloadHost`]
//! and the status notifications it emits.

pub mod mock;

pub use mock::MockHost;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SubmissionError;
use crate::payload::ExportPayload;

/// Download state reported once the file has been written.
pub const STATE_COMPLETE: &str = "complete";
/// Download error reported when the host failed to write the file.
pub const ERROR_FILE_FAILED: &str = "FILE_FAILED";

/// Identifier the host assigns to an accepted download
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DownloadId(pub u64);

impl fmt::Display for DownloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transient in-memory resource backing a download.
///
/// Not `Clone`: releasing consumes the handle, so it can be released at most
/// once.
#[derive(Debug, PartialEq, Eq)]
pub struct ResourceHandle {
    url: String,
}

impl ResourceHandle {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// URL the host downloads the payload from
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// What the host does when the target file already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictAction {
    /// Append a disambiguating suffix
    Uniquify,
    /// Replace the existing file
    Overwrite,
}

impl ConflictAction {
    pub fn for_export(is_backup: bool) -> Self {
        if is_backup {
            Self::Overwrite
        } else {
            Self::Uniquify
        }
    }
}

/// Request submitted to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequest {
    pub url: String,
    pub filename: String,
    pub conflict_action: ConflictAction,
    /// Ask the user where to save
    pub save_as: bool,
}

/// Current/previous pair carried by a changed download property
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringDelta {
    #[serde(default)]
    pub current: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
}

/// Status change notification as emitted by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadDelta {
    pub id: DownloadId,
    #[serde(default)]
    pub state: Option<StringDelta>,
    #[serde(default)]
    pub error: Option<StringDelta>,
}

/// What a status notification means for a tracked download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    /// The file was written
    Complete,
    /// The host failed to write the file
    Failed,
    /// Anything else (progress, pause, other errors)
    Other,
}

impl DownloadDelta {
    pub fn complete(id: DownloadId) -> Self {
        Self {
            id,
            state: Some(StringDelta {
                current: Some(STATE_COMPLETE.to_string()),
                previous: Some("in_progress".to_string()),
            }),
            error: None,
        }
    }

    pub fn failed(id: DownloadId, error: &str) -> Self {
        Self {
            id,
            state: None,
            error: Some(StringDelta {
                current: Some(error.to_string()),
                previous: None,
            }),
        }
    }

    /// Classify this notification. A `complete` state wins over an error
    /// reported in the same notification.
    pub fn status(&self) -> DownloadStatus {
        if current(&self.state) == Some(STATE_COMPLETE) {
            DownloadStatus::Complete
        } else if current(&self.error) == Some(ERROR_FILE_FAILED) {
            DownloadStatus::Failed
        } else {
            DownloadStatus::Other
        }
    }
}

fn current(delta: &Option<StringDelta>) -> Option<&str> {
    delta.as_ref()?.current.as_deref()
}

/// Host download facility
#[async_trait]
pub trait DownloadHost: Send + Sync {
    /// Create the transient resource the download reads from
    fn create_resource(&self, payload: &ExportPayload) -> ResourceHandle;

    /// Submit a download. Fails when the host refuses the request or the
    /// user cancels the save dialog.
    async fn submit_download(
        &self,
        request: DownloadRequest,
    ) -> std::result::Result<DownloadId, SubmissionError>;

    /// Remove a download from the host's history. Best effort.
    fn erase_download_record(&self, id: DownloadId);

    /// Release a resource created by [`DownloadHost::create_resource`]
    fn release_resource(&self, handle: ResourceHandle);

    /// Host name for logs
    fn name(&self) -> &'static str;
}
